//! Environment bridge: the episode state machine.
//!
//! Reconciles the simulator's asynchronous sensor feed with the synchronous
//! control loop. The bridge is queried exactly once per tick: it dispatches
//! one command paired with one tick advance, waits out the fixed tick
//! interval so callback writes land, then reads a consistent snapshot of
//! sensor state to produce the transition.
//!
//! Phase machine: `Idle -> Running -> Terminated -> (reset) -> Running`.
//! A `step` call that arrives after a terminal condition was already
//! reported redirects to `reset`: a stale terminal state starts a fresh
//! episode rather than silently continuing.

use crate::core::spec::{ActionSpec, ObservationSpec, ACTION_DIM};
use crate::env::sensors::SharedSensorHub;
use crate::env::simulator::{DriveCommand, SimulatorError, SimulatorLink, TickClock};
use std::time::Duration;

/// Episode phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No episode in progress; `reset` has not run yet.
    Idle,
    /// Episode in progress.
    Running,
    /// The last step reported a terminal condition; the next `step`
    /// redirects to `reset`.
    Terminated,
}

/// Result of one bridge step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Latest normalized observation.
    pub observation: Vec<f32>,
    /// Reward for this step.
    pub reward: f64,
    /// Whether a terminal condition was observed this step.
    pub done: bool,
    /// The command actually dispatched (after clipping and any autopilot
    /// override). This is the action to record for off-policy learning.
    pub executed_action: [f32; ACTION_DIM],
    /// True when the call was redirected to `reset`; the observation is
    /// then an initial frame and `reward`/`done` carry no step semantics.
    pub restarted: bool,
}

/// Owns the sensor snapshot, the command dispatch protocol, and the episode
/// state machine.
pub struct EnvironmentBridge<L: SimulatorLink> {
    link: L,
    sensors: SharedSensorHub,
    clock: TickClock,
    action_spec: ActionSpec,
    observation_spec: ObservationSpec,
    phase: Phase,
    last_steering: f32,
    cumulative_reward: f64,
}

impl<L: SimulatorLink> EnvironmentBridge<L> {
    /// Create a bridge over a simulator link.
    ///
    /// Action bounds come from the simulator-reported vehicle limits.
    pub fn new(link: L, sensors: SharedSensorHub, tick_period: Duration) -> Self {
        let action_spec = ActionSpec::new(link.max_speed(), link.max_steering_angle());
        Self {
            link,
            sensors,
            clock: TickClock::new(tick_period),
            action_spec,
            observation_spec: ObservationSpec::new(),
            phase: Phase::Idle,
            last_steering: 0.0,
            cumulative_reward: 0.0,
        }
    }

    /// The action spec (speed and steering bounds).
    pub fn action_spec(&self) -> &ActionSpec {
        &self.action_spec
    }

    /// The observation spec (84x84x3, `[0, 1]`).
    pub fn observation_spec(&self) -> &ObservationSpec {
        &self.observation_spec
    }

    /// Current episode phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reward accumulated over the current episode.
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    /// The shared sensor hub (for wiring simulator callbacks).
    pub fn sensors(&self) -> &SharedSensorHub {
        &self.sensors
    }

    /// Start a fresh episode and return the initial observation.
    ///
    /// Waits one tick interval, clears episode state, repositions the
    /// vehicle, then dispatches a zero command paired with one tick advance.
    pub fn reset(&mut self) -> Result<Vec<f32>, SimulatorError> {
        self.clock.wait();
        self.sensors.reset_episode();
        self.last_steering = 0.0;
        self.cumulative_reward = 0.0;

        self.link.respawn_vehicle()?;
        self.link.send_command(DriveCommand::stop())?;
        self.link.advance()?;

        self.phase = Phase::Running;
        Ok(self.sensors.frame())
    }

    /// Dispatch one command and observe the resulting transition.
    ///
    /// If the previous step already reported a terminal condition, the call
    /// redirects to [`EnvironmentBridge::reset`] and returns a restarted
    /// outcome instead of acting on `action`.
    ///
    /// With `autopilot` set, the executed command comes from the simulator's
    /// external driver rather than from `action`; the outcome reports the
    /// executed command either way so the caller records valid off-policy
    /// experience.
    pub fn step(
        &mut self,
        action: [f32; ACTION_DIM],
        autopilot: bool,
    ) -> Result<StepOutcome, SimulatorError> {
        if self.phase != Phase::Running {
            let observation = self.reset()?;
            return Ok(StepOutcome {
                observation,
                reward: 0.0,
                done: false,
                executed_action: [0.0; ACTION_DIM],
                restarted: true,
            });
        }

        let mut executed = if autopilot {
            let cmd = self.link.autopilot_command()?;
            [cmd.speed, cmd.steering_angle]
        } else {
            action
        };
        // Out-of-range values are a caller bug; clamp deterministically.
        self.action_spec.clip(&mut executed);

        self.link
            .send_command(DriveCommand::new(executed[0], executed[1]))?;
        self.clock.wait();
        self.link.advance()?;

        let violated = self.sensors.violation();
        let reward = self.compute_reward(executed, violated);
        self.cumulative_reward += reward;

        if violated {
            self.phase = Phase::Terminated;
        }

        Ok(StepOutcome {
            observation: self.sensors.frame(),
            reward,
            done: violated,
            executed_action: executed,
            restarted: false,
        })
    }

    /// Complete the in-flight actuation and release sensor subscriptions.
    ///
    /// Dispatches a stop command paired with one advance so the simulator
    /// is never left mid-actuation.
    pub fn shutdown(&mut self) -> Result<(), SimulatorError> {
        self.link.send_command(DriveCommand::stop())?;
        self.link.advance()?;
        self.link.release_sensors();
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Reward rule.
    ///
    /// `-1` for crawling (at or below half of max speed) or for a terminal
    /// condition; otherwise normalized speed minus the steering change,
    /// scaled down by 1000 so per-step rewards stay small relative to the
    /// termination penalty.
    fn compute_reward(&mut self, executed: [f32; ACTION_DIM], violated: bool) -> f64 {
        let max_speed = self.action_spec.max_speed();
        if executed[0] <= 0.5 * max_speed || violated {
            return -1.0;
        }
        let speed_term = (executed[0] / max_speed) as f64;
        let steering_term = (self.last_steering - executed[1]).abs() as f64;
        self.last_steering = executed[1];
        (speed_term - steering_term) / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::sensors::{sensor_hub, LaneMarking};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Simulator double that records the dispatch protocol.
    #[derive(Default)]
    struct LinkLog {
        commands: Vec<DriveCommand>,
        advances: usize,
        respawns: usize,
        released: bool,
    }

    struct MockLink {
        log: Arc<Mutex<LinkLog>>,
        autopilot: DriveCommand,
    }

    impl MockLink {
        fn new() -> (Self, Arc<Mutex<LinkLog>>) {
            let log = Arc::new(Mutex::new(LinkLog::default()));
            (
                Self {
                    log: Arc::clone(&log),
                    autopilot: DriveCommand::new(20.0, 0.1),
                },
                log,
            )
        }
    }

    impl SimulatorLink for MockLink {
        fn send_command(&mut self, command: DriveCommand) -> Result<(), SimulatorError> {
            self.log.lock().commands.push(command);
            Ok(())
        }

        fn advance(&mut self) -> Result<(), SimulatorError> {
            self.log.lock().advances += 1;
            Ok(())
        }

        fn respawn_vehicle(&mut self) -> Result<(), SimulatorError> {
            self.log.lock().respawns += 1;
            Ok(())
        }

        fn autopilot_command(&mut self) -> Result<DriveCommand, SimulatorError> {
            Ok(self.autopilot)
        }

        fn max_steering_angle(&self) -> f32 {
            0.7
        }

        fn max_speed(&self) -> f32 {
            27.0
        }

        fn release_sensors(&mut self) {
            self.log.lock().released = true;
        }
    }

    fn bridge() -> (EnvironmentBridge<MockLink>, Arc<Mutex<LinkLog>>) {
        let (link, log) = MockLink::new();
        let b = EnvironmentBridge::new(link, sensor_hub(), Duration::ZERO);
        (b, log)
    }

    #[test]
    fn test_reset_protocol() {
        let (mut b, log) = bridge();
        assert_eq!(b.phase(), Phase::Idle);

        let obs = b.reset().unwrap();
        assert_eq!(obs.len(), crate::core::spec::OBS_LEN);
        assert_eq!(b.phase(), Phase::Running);

        let log = log.lock();
        assert_eq!(log.respawns, 1);
        assert_eq!(log.commands, vec![DriveCommand::stop()]);
        // One command pairs with one advance.
        assert_eq!(log.advances, 1);
    }

    #[test]
    fn test_slow_speed_penalty_regardless_of_steering() {
        let (mut b, _) = bridge();
        b.reset().unwrap();

        // 0.4 * V_max is below the half-speed threshold.
        let out = b.step([0.4 * 27.0, 0.5], false).unwrap();
        assert_eq!(out.reward, -1.0);
        assert!(!out.done);
    }

    #[test]
    fn test_full_speed_straight_reward() {
        let (mut b, _) = bridge();
        b.reset().unwrap();

        let out = b.step([27.0, 0.0], false).unwrap();
        assert_eq!(out.reward, 0.001);
        assert!(!out.done);
    }

    #[test]
    fn test_steering_change_penalizes_reward() {
        let (mut b, _) = bridge();
        b.reset().unwrap();

        let out = b.step([27.0, 0.2], false).unwrap();
        assert!((out.reward - (1.0 - 0.2f32 as f64) / 1000.0).abs() < 1e-12);

        // Steering is now latched at 0.2; holding it costs nothing.
        let out = b.step([27.0, 0.2], false).unwrap();
        assert_eq!(out.reward, 0.001);
    }

    #[test]
    fn test_crawling_does_not_update_last_steering() {
        let (mut b, _) = bridge();
        b.reset().unwrap();

        // Penalty branch leaves last_steering at zero.
        b.step([1.0, 0.5], false).unwrap();
        let out = b.step([27.0, 0.0], false).unwrap();
        assert_eq!(out.reward, 0.001);
    }

    #[test]
    fn test_terminal_latch_then_redirect() {
        let (mut b, log) = bridge();
        b.reset().unwrap();

        // Collision fires asynchronously during the tick.
        b.sensors().on_collision([1.0, 0.0, 0.0]);

        // Next step reports the termination with the -1 penalty.
        let out = b.step([27.0, 0.0], false).unwrap();
        assert!(out.done);
        assert_eq!(out.reward, -1.0);
        assert_eq!(b.phase(), Phase::Terminated);

        // The following call redirects to reset regardless of action.
        let respawns_before = log.lock().respawns;
        let out = b.step([27.0, 0.0], false).unwrap();
        assert!(out.restarted);
        assert!(!out.done);
        assert_eq!(b.phase(), Phase::Running);
        assert_eq!(log.lock().respawns, respawns_before + 1);
    }

    #[test]
    fn test_lane_crossing_terminates() {
        let (mut b, _) = bridge();
        b.reset().unwrap();

        b.sensors().on_lane_invasion(&[LaneMarking::Solid]);
        let out = b.step([27.0, 0.0], false).unwrap();
        assert!(out.done);
        assert_eq!(out.reward, -1.0);
    }

    #[test]
    fn test_step_before_reset_redirects() {
        let (mut b, _) = bridge();
        let out = b.step([10.0, 0.0], false).unwrap();
        assert!(out.restarted);
        assert_eq!(b.phase(), Phase::Running);
    }

    #[test]
    fn test_out_of_range_action_clipped_before_dispatch() {
        let (mut b, log) = bridge();
        b.reset().unwrap();

        let out = b.step([500.0, -3.0], false).unwrap();
        assert_eq!(out.executed_action, [27.0, -0.7]);
        assert_eq!(
            *log.lock().commands.last().unwrap(),
            DriveCommand::new(27.0, -0.7)
        );
    }

    #[test]
    fn test_autopilot_overrides_requested_action() {
        let (mut b, log) = bridge();
        b.reset().unwrap();

        let out = b.step([5.0, -0.5], true).unwrap();
        assert_eq!(out.executed_action, [20.0, 0.1]);
        assert_eq!(
            *log.lock().commands.last().unwrap(),
            DriveCommand::new(20.0, 0.1)
        );
    }

    #[test]
    fn test_cumulative_reward_resets_per_episode() {
        let (mut b, _) = bridge();
        b.reset().unwrap();
        b.step([27.0, 0.0], false).unwrap();
        b.step([27.0, 0.0], false).unwrap();
        assert!((b.cumulative_reward() - 0.002).abs() < 1e-12);

        b.reset().unwrap();
        assert_eq!(b.cumulative_reward(), 0.0);
    }

    #[test]
    fn test_shutdown_dispatches_stop_before_release() {
        let (mut b, log) = bridge();
        b.reset().unwrap();
        b.shutdown().unwrap();

        let log = log.lock();
        assert_eq!(*log.commands.last().unwrap(), DriveCommand::stop());
        assert_eq!(log.advances, 2); // reset + shutdown
        assert!(log.released);
        assert_eq!(b.phase(), Phase::Idle);
    }

    #[test]
    fn test_every_command_pairs_with_an_advance() {
        let (mut b, log) = bridge();
        b.reset().unwrap();
        b.step([27.0, 0.0], false).unwrap();
        b.step([27.0, 0.1], false).unwrap();
        b.shutdown().unwrap();

        let log = log.lock();
        assert_eq!(log.commands.len(), log.advances);
    }
}
