//! Remote commands from the dashboard
//!
//! Decodes virtual pin writes forwarded by the bridge into typed commands.
//! Integer pins follow the dashboard convention: non-zero means pressed.

use aubade_protocol::{PinValue, PinWrite, VirtualPin};

use crate::clock::TimeOfDay;
use crate::state::ManualDirection;

/// Decoded dashboard command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Hold-to-run button pressed or released
    Manual {
        direction: ManualDirection,
        pressed: bool,
    },
    /// New daily open time
    SetOpenTime(TimeOfDay),
    /// New daily close time
    SetCloseTime(TimeOfDay),
    /// Open fully now
    OpenFull,
    /// Close fully now
    CloseFull,
    /// Halt the motor and drop queued moves
    EmergencyStop,
}

/// Rejected dashboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Integer written to a time pin or time written to an integer pin
    WrongValueKind(VirtualPin),
    /// Time input outside one day
    TimeOutOfRange(u32),
}

/// Decode a pin write
///
/// Returns `Ok(None)` for writes that carry no command: releasing a
/// momentary trigger button or clearing a time input.
pub fn decode(write: &PinWrite) -> Result<Option<Command>, CommandError> {
    match (write.pin, write.value) {
        (VirtualPin::ManualDown, PinValue::Int(v)) => Ok(Some(Command::Manual {
            direction: ManualDirection::Down,
            pressed: v != 0,
        })),
        (VirtualPin::ManualUp, PinValue::Int(v)) => Ok(Some(Command::Manual {
            direction: ManualDirection::Up,
            pressed: v != 0,
        })),
        (VirtualPin::OpenFull, PinValue::Int(v)) => Ok((v != 0).then_some(Command::OpenFull)),
        (VirtualPin::CloseFull, PinValue::Int(v)) => Ok((v != 0).then_some(Command::CloseFull)),
        (VirtualPin::EmergencyStop, PinValue::Int(v)) => {
            Ok((v != 0).then_some(Command::EmergencyStop))
        }
        (VirtualPin::OpenTime, PinValue::TimeInput { start_s }) => {
            Ok(decode_time(start_s)?.map(Command::SetOpenTime))
        }
        (VirtualPin::CloseTime, PinValue::TimeInput { start_s }) => {
            Ok(decode_time(start_s)?.map(Command::SetCloseTime))
        }
        (pin, _) => Err(CommandError::WrongValueKind(pin)),
    }
}

fn decode_time(start_s: Option<u32>) -> Result<Option<TimeOfDay>, CommandError> {
    match start_s {
        None => Ok(None),
        Some(s) => TimeOfDay::from_seconds_of_day(s)
            .map(Some)
            .ok_or(CommandError::TimeOutOfRange(s)),
    }
}
