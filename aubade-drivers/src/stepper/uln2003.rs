//! ULN2003 four-wire stepper driver
//!
//! The ULN2003 is a Darlington array with no logic of its own: each input
//! switches one coil of a unipolar motor such as the 28BYJ-48. The driver
//! walks the full-step sequence with two adjacent coils energized, which
//! gives more torque than wave drive at the same speed.
//!
//! # Wiring
//!
//! ```text
//! IN1 ── coil A (blue)
//! IN2 ── coil B (pink)
//! IN3 ── coil C (yellow)
//! IN4 ── coil D (orange)
//! ```

use aubade_core::traits::{Direction, StepperDriver, StepperError};
use embedded_hal::digital::OutputPin;

/// Full-step sequence, one row per phase, coils IN1..IN4
const FULL_STEP: [[bool; 4]; 4] = [
    [true, true, false, false],
    [false, true, true, false],
    [false, false, true, true],
    [true, false, false, true],
];

/// ULN2003 coil driver
pub struct Uln2003<P> {
    coils: [P; 4],
    /// Index into the full-step table
    phase: u8,
    invert_direction: bool,
    energized: bool,
}

impl<P: OutputPin> Uln2003<P> {
    /// Create a driver with all coils released
    ///
    /// # Arguments
    /// - `coils`: IN1..IN4 outputs
    /// - `invert_direction`: swap the sequence order (motor mounted mirrored)
    pub fn new(coils: [P; 4], invert_direction: bool) -> Result<Self, StepperError> {
        let mut driver = Self {
            coils,
            phase: 0,
            invert_direction,
            energized: false,
        };
        driver.release()?;
        Ok(driver)
    }

    /// Current phase of the step sequence
    pub fn phase(&self) -> u8 {
        self.phase
    }

    fn write_coils(&mut self, pattern: [bool; 4]) -> Result<(), StepperError> {
        for (pin, on) in self.coils.iter_mut().zip(pattern) {
            if on {
                pin.set_high().map_err(|_| StepperError::PinError)?;
            } else {
                pin.set_low().map_err(|_| StepperError::PinError)?;
            }
        }
        Ok(())
    }
}

impl<P: OutputPin> StepperDriver for Uln2003<P> {
    fn step(&mut self, direction: Direction) -> Result<(), StepperError> {
        let direction = if self.invert_direction {
            direction.opposite()
        } else {
            direction
        };

        // A released rotor is pulled back onto its held phase before moving,
        // so every call is one physical step
        if !self.energized {
            self.write_coils(FULL_STEP[self.phase as usize])?;
            self.energized = true;
        }

        self.phase = match direction {
            Direction::Clockwise => (self.phase + 1) % 4,
            Direction::CounterClockwise => (self.phase + 3) % 4,
        };
        self.write_coils(FULL_STEP[self.phase as usize])
    }

    fn release(&mut self) -> Result<(), StepperError> {
        self.write_coils([false; 4])?;
        self.energized = false;
        Ok(())
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}
