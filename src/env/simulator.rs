//! Simulator actuation link and tick pacing.
//!
//! The simulator runs in synchronous mode: one actuator command is paired
//! with one "advance one tick" signal per control tick. A command without
//! the advance never takes effect; an advance without a fresh command
//! repeats the last command. [`SimulatorLink`] abstracts this transport so
//! the bridge can be driven against a real simulator or a test double.

use std::fmt;
use std::time::{Duration, Instant};

/// One actuator command: forward speed and steering angle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    /// Forward speed in `[0, max_speed]`.
    pub speed: f32,
    /// Steering angle in `[-max_steering, max_steering]`.
    pub steering_angle: f32,
}

impl DriveCommand {
    /// Create a command.
    pub fn new(speed: f32, steering_angle: f32) -> Self {
        Self {
            speed,
            steering_angle,
        }
    }

    /// The stop command: zero speed, zero steering.
    pub fn stop() -> Self {
        Self::default()
    }
}

/// Error type for simulator transport failures.
#[derive(Debug)]
pub enum SimulatorError {
    /// No tick acknowledgment arrived within the timeout. Fatal for the
    /// run; reconnection is delegated to an external supervisor.
    TickTimeout(Duration),
    /// The transport to the simulator failed.
    Transport(String),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::TickTimeout(t) => {
                write!(f, "no tick acknowledgment within {:?}", t)
            }
            SimulatorError::Transport(msg) => write!(f, "simulator transport error: {}", msg),
        }
    }
}

impl std::error::Error for SimulatorError {}

/// Transport to the simulated world.
///
/// Sensor delivery is push-based and arrives through [`super::SensorHub`]
/// callbacks on the simulator's event thread; this trait covers the
/// control-thread side only.
pub trait SimulatorLink: Send {
    /// Dispatch an actuator command. Takes effect on the next `advance`.
    fn send_command(&mut self, command: DriveCommand) -> Result<(), SimulatorError>;

    /// Advance the simulated world by one tick and wait for acknowledgment.
    fn advance(&mut self) -> Result<(), SimulatorError>;

    /// Reposition the vehicle to a spawn pose for a fresh episode.
    fn respawn_vehicle(&mut self) -> Result<(), SimulatorError>;

    /// The externally-driven action source used while the autopilot
    /// exploration flag is on.
    fn autopilot_command(&mut self) -> Result<DriveCommand, SimulatorError>;

    /// Simulator-reported maximum steering angle of the vehicle.
    fn max_steering_angle(&self) -> f32;

    /// Simulator-reported maximum forward speed of the vehicle.
    fn max_speed(&self) -> f32;

    /// Release sensor subscriptions. Called once at shutdown, after the
    /// final stop command has been dispatched.
    fn release_sensors(&mut self);
}

/// Fixed-interval rate limiter for the control loop.
///
/// `wait` sleeps out the remainder of the current tick period, so sensor
/// callbacks that fire during the wait are visible when the control thread
/// wakes.
pub struct TickClock {
    period: Duration,
    last: Option<Instant>,
}

impl TickClock {
    /// Create a clock with the given tick period.
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Create a clock from a tick rate in Hz.
    pub fn from_rate(hz: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz))
    }

    /// The tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the current tick interval has elapsed.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last {
            let elapsed = now.duration_since(last);
            if elapsed < self.period {
                std::thread::sleep(self.period - elapsed);
            }
        } else {
            // First wait paces a full interval, matching a fresh reset.
            std::thread::sleep(self.period);
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_command_stop() {
        let cmd = DriveCommand::stop();
        assert_eq!(cmd.speed, 0.0);
        assert_eq!(cmd.steering_angle, 0.0);
    }

    #[test]
    fn test_tick_clock_paces_interval() {
        let period = Duration::from_millis(20);
        let mut clock = TickClock::new(period);

        let start = Instant::now();
        clock.wait();
        clock.wait();
        // Two waits span at least two periods, minus scheduler slack.
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_tick_clock_from_rate() {
        let clock = TickClock::from_rate(20.0);
        assert_eq!(clock.period(), Duration::from_millis(50));
    }
}
