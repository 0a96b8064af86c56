//! Stepper motor driver trait
//!
//! This trait abstracts over coil-level stepper drivers (ULN2003 and
//! similar Darlington arrays) that are stepped one full step at a time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (step count increases)
    Clockwise,
    /// Counter-clockwise rotation (step count decreases)
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Direction for a signed step delta, `None` for zero
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(Direction::Clockwise),
            -1 => Some(Direction::CounterClockwise),
            _ => None,
        }
    }
}

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// A coil output could not be driven
    PinError,
}

/// Trait for stepper motor drivers
pub trait StepperDriver {
    /// Advance the rotor one step in `direction`
    fn step(&mut self, direction: Direction) -> Result<(), StepperError>;

    /// De-energize all coils; the rotor is free and holds no torque
    fn release(&mut self) -> Result<(), StepperError>;

    /// Whether any coil is currently energized
    fn is_energized(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(3), Some(Direction::Clockwise));
        assert_eq!(Direction::from_delta(-1), Some(Direction::CounterClockwise));
        assert_eq!(Direction::from_delta(0), None);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Direction::Clockwise.opposite(), Direction::CounterClockwise);
        assert_eq!(Direction::CounterClockwise.opposite(), Direction::Clockwise);
    }
}
