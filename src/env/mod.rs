//! Environment bridge: simulator link, sensor hub, episode state machine.

pub mod bridge;
pub mod sensors;
pub mod simulator;

pub use bridge::{EnvironmentBridge, Phase, StepOutcome};
pub use sensors::{LaneMarking, SensorHub, SharedSensorHub};
pub use simulator::{DriveCommand, SimulatorError, SimulatorLink, TickClock};
