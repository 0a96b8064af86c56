//! Motion planning and move execution
//!
//! Positions are absolute step counts. Zero is fully closed; opening moves
//! toward negative counts.

pub mod executor;
pub mod planner;
pub mod travel;

pub use executor::{ActiveMove, MoveExecutor, MoveOutcome, MoveResult};
pub use planner::{MotionState, StepPlanner};
pub use travel::TravelConfig;

/// Command sent from the controller to the motor task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorCommand {
    /// Drive to an absolute position, never faster than `max_speed_sps`
    MoveTo { target: i32, max_speed_sps: u16 },
    /// Stop where the motor is now
    Halt,
}
