//! Dashboard virtual pins
//!
//! The cloud dashboard exposes seven virtual pins. The bridge forwards every
//! write to one of them as a [`PinWrite`].

use serde::{Deserialize, Serialize};

/// Virtual pins used by the blind dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VirtualPin {
    /// V0: hold-to-run downward button
    ManualDown,
    /// V1: hold-to-run upward button
    ManualUp,
    /// V2: close time input
    CloseTime,
    /// V3: open time input
    OpenTime,
    /// V4: open fully now
    OpenFull,
    /// V5: close fully now
    CloseFull,
    /// V6: emergency stop
    EmergencyStop,
}

impl VirtualPin {
    /// Parse a pin from its dashboard number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(VirtualPin::ManualDown),
            1 => Some(VirtualPin::ManualUp),
            2 => Some(VirtualPin::CloseTime),
            3 => Some(VirtualPin::OpenTime),
            4 => Some(VirtualPin::OpenFull),
            5 => Some(VirtualPin::CloseFull),
            6 => Some(VirtualPin::EmergencyStop),
            _ => None,
        }
    }

    /// Dashboard number of this pin
    pub fn number(self) -> u8 {
        match self {
            VirtualPin::ManualDown => 0,
            VirtualPin::ManualUp => 1,
            VirtualPin::CloseTime => 2,
            VirtualPin::OpenTime => 3,
            VirtualPin::OpenFull => 4,
            VirtualPin::CloseFull => 5,
            VirtualPin::EmergencyStop => 6,
        }
    }

    /// Pins that carry a time input widget rather than an integer
    pub fn is_time_input(self) -> bool {
        matches!(self, VirtualPin::OpenTime | VirtualPin::CloseTime)
    }
}

/// Value written to a virtual pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinValue {
    /// Integer widget value (buttons send 0/1)
    Int(i32),
    /// Time input widget; start time in seconds after local midnight,
    /// `None` when the user cleared the field
    TimeInput { start_s: Option<u32> },
}

// Wire tags for PinValue
const VALUE_INT: u8 = 0x00;
const VALUE_TIME: u8 = 0x01;
const VALUE_TIME_EMPTY: u8 = 0x02;

/// Encoded size of a pin write: pin, tag, 4 value bytes
pub const PIN_WRITE_LEN: usize = 6;

/// A single write to a dashboard virtual pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinWrite {
    pub pin: VirtualPin,
    pub value: PinValue,
}

impl PinWrite {
    pub fn new(pin: VirtualPin, value: PinValue) -> Self {
        Self { pin, value }
    }

    /// Shorthand for an integer write
    pub fn int(pin: VirtualPin, value: i32) -> Self {
        Self::new(pin, PinValue::Int(value))
    }

    /// Decode from `[pin][tag][value: u32/i32 little endian]`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PIN_WRITE_LEN {
            return None;
        }
        let pin = VirtualPin::from_number(bytes[0])?;
        let raw = [bytes[2], bytes[3], bytes[4], bytes[5]];
        let value = match bytes[1] {
            VALUE_INT => PinValue::Int(i32::from_le_bytes(raw)),
            VALUE_TIME => PinValue::TimeInput {
                start_s: Some(u32::from_le_bytes(raw)),
            },
            VALUE_TIME_EMPTY => PinValue::TimeInput { start_s: None },
            _ => return None,
        };
        Some(Self { pin, value })
    }

    /// Encode into the wire layout
    pub fn to_bytes(&self) -> [u8; PIN_WRITE_LEN] {
        let (tag, raw) = match self.value {
            PinValue::Int(v) => (VALUE_INT, v.to_le_bytes()),
            PinValue::TimeInput { start_s: Some(s) } => (VALUE_TIME, s.to_le_bytes()),
            PinValue::TimeInput { start_s: None } => (VALUE_TIME_EMPTY, [0; 4]),
        };
        [self.pin.number(), tag, raw[0], raw[1], raw[2], raw[3]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_numbers() {
        for n in 0..=6u8 {
            let pin = VirtualPin::from_number(n).unwrap();
            assert_eq!(pin.number(), n);
        }
        assert_eq!(VirtualPin::from_number(7), None);
    }

    #[test]
    fn test_time_input_pins() {
        assert!(VirtualPin::OpenTime.is_time_input());
        assert!(VirtualPin::CloseTime.is_time_input());
        assert!(!VirtualPin::ManualUp.is_time_input());
        assert!(!VirtualPin::EmergencyStop.is_time_input());
    }

    #[test]
    fn test_decode_int_write() {
        let bytes = [4, VALUE_INT, 1, 0, 0, 0];
        let write = PinWrite::from_bytes(&bytes).unwrap();
        assert_eq!(write, PinWrite::int(VirtualPin::OpenFull, 1));
    }

    #[test]
    fn test_decode_time_write() {
        // 07:03 = 25380 s
        let secs = 25_380u32.to_le_bytes();
        let bytes = [3, VALUE_TIME, secs[0], secs[1], secs[2], secs[3]];
        let write = PinWrite::from_bytes(&bytes).unwrap();
        assert_eq!(write.pin, VirtualPin::OpenTime);
        assert_eq!(write.value, PinValue::TimeInput { start_s: Some(25_380) });
    }

    #[test]
    fn test_decode_empty_time_write() {
        let bytes = [2, VALUE_TIME_EMPTY, 0xFF, 0xFF, 0xFF, 0xFF];
        let write = PinWrite::from_bytes(&bytes).unwrap();
        assert_eq!(write.value, PinValue::TimeInput { start_s: None });
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(PinWrite::from_bytes(&[9, VALUE_INT, 0, 0, 0, 0]), None);
        assert_eq!(PinWrite::from_bytes(&[0, 0x7F, 0, 0, 0, 0]), None);
        assert_eq!(PinWrite::from_bytes(&[0, VALUE_INT, 0]), None);
    }

    #[test]
    fn test_negative_int_survives_encoding() {
        let write = PinWrite::int(VirtualPin::ManualDown, -1);
        assert_eq!(PinWrite::from_bytes(&write.to_bytes()), Some(write));
    }
}
