//! Message types for the bridge link
//!
//! Message types are divided into two categories:
//! - Bridge → Controller: dashboard pin writes, network time, heartbeat
//! - Controller → Bridge: status reports, time requests, heartbeat responses

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::pins::PinWrite;

// Message type IDs: Bridge → Controller
pub const MSG_PIN_WRITE: u8 = 0x01;
pub const MSG_TIME: u8 = 0x02;
pub const MSG_PING: u8 = 0x03;
pub const MSG_TIME_UNAVAILABLE: u8 = 0x04;

// Message type IDs: Controller → Bridge
pub const MSG_PONG: u8 = 0x20;
pub const MSG_TIME_REQUEST: u8 = 0x21;
pub const MSG_STATUS: u8 = 0x22;
pub const MSG_PIN_UPDATE: u8 = 0x23;

/// Messages from the bridge to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeMessage {
    /// Dashboard wrote a virtual pin
    PinWrite(PinWrite),
    /// Network time, seconds since the Unix epoch (UTC)
    Time { epoch_s: u32 },
    /// The bridge could not obtain network time
    TimeUnavailable,
    /// Heartbeat request
    Ping,
}

impl BridgeMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PIN_WRITE => PinWrite::from_bytes(&frame.payload)
                .map(BridgeMessage::PinWrite)
                .ok_or(FrameError::InvalidFrame),
            MSG_TIME => {
                let raw: [u8; 4] = frame
                    .payload
                    .as_slice()
                    .try_into()
                    .map_err(|_| FrameError::InvalidFrame)?;
                Ok(BridgeMessage::Time {
                    epoch_s: u32::from_le_bytes(raw),
                })
            }
            MSG_TIME_UNAVAILABLE => Ok(BridgeMessage::TimeUnavailable),
            MSG_PING => Ok(BridgeMessage::Ping),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame (used by bridge simulators and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            BridgeMessage::PinWrite(write) => Frame::new(MSG_PIN_WRITE, &write.to_bytes()),
            BridgeMessage::Time { epoch_s } => Frame::new(MSG_TIME, &epoch_s.to_le_bytes()),
            BridgeMessage::TimeUnavailable => Ok(Frame::empty(MSG_TIME_UNAVAILABLE)),
            BridgeMessage::Ping => Ok(Frame::empty(MSG_PING)),
        }
    }
}

/// Blind state as reported to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportedState {
    Idle,
    GradualOpen,
    FullOpen,
    FullClose,
    ManualUp,
    ManualDown,
    EmergencyStop,
}

/// Periodic status snapshot sent to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub state: ReportedState,
    /// Absolute motor position in steps
    pub position: i32,
    /// Target of the active move, if any
    pub target: Option<i32>,
    pub opened_today: bool,
    pub closed_today: bool,
    pub gradual_started: bool,
    /// Wall clock has been synced at least once
    pub clock_synced: bool,
}

/// Messages from the controller to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMessage {
    /// Heartbeat response
    Pong,
    /// Ask the bridge for fresh network time
    TimeRequest,
    /// Status snapshot
    Status(StatusReport),
    /// Push a value back to a dashboard pin (e.g. release a momentary button)
    PinUpdate(PinWrite),
}

impl ControllerMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ControllerMessage::Pong => Ok(Frame::empty(MSG_PONG)),
            ControllerMessage::TimeRequest => Ok(Frame::empty(MSG_TIME_REQUEST)),
            ControllerMessage::Status(report) => {
                let mut buf = [0u8; MAX_PAYLOAD_SIZE];
                let used = postcard::to_slice(report, &mut buf)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_STATUS, used)
            }
            ControllerMessage::PinUpdate(write) => Frame::new(MSG_PIN_UPDATE, &write.to_bytes()),
        }
    }

    /// Parse a message from a frame (used by bridge simulators and tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PONG => Ok(ControllerMessage::Pong),
            MSG_TIME_REQUEST => Ok(ControllerMessage::TimeRequest),
            MSG_STATUS => postcard::from_bytes(&frame.payload)
                .map(ControllerMessage::Status)
                .map_err(|_| FrameError::InvalidFrame),
            MSG_PIN_UPDATE => PinWrite::from_bytes(&frame.payload)
                .map(ControllerMessage::PinUpdate)
                .ok_or(FrameError::InvalidFrame),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;
    use crate::pins::{PinValue, VirtualPin};

    #[test]
    fn test_parse_time_message() {
        let frame = Frame::new(MSG_TIME, &1_700_000_000u32.to_le_bytes()).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&frame),
            Ok(BridgeMessage::Time {
                epoch_s: 1_700_000_000
            })
        );
    }

    #[test]
    fn test_time_message_wrong_length() {
        let frame = Frame::new(MSG_TIME, &[1, 2, 3]).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_parse_pin_write_over_the_wire() {
        let msg = BridgeMessage::PinWrite(PinWrite::new(
            VirtualPin::CloseTime,
            PinValue::TimeInput {
                start_s: Some(72_000),
            },
        ));
        let bytes = msg.to_frame().unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let frame = parser.feed_bytes(&bytes).unwrap().unwrap();
        assert_eq!(BridgeMessage::from_frame(&frame), Ok(msg));
    }

    #[test]
    fn test_unknown_message_type() {
        let frame = Frame::empty(0x55);
        assert_eq!(
            BridgeMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
        assert_eq!(
            ControllerMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_status_report_fits_in_payload() {
        let report = StatusReport {
            state: ReportedState::FullOpen,
            position: -90_845,
            target: Some(i32::MIN),
            opened_today: true,
            closed_today: false,
            gradual_started: true,
            clock_synced: true,
        };
        let frame = ControllerMessage::Status(report).to_frame().unwrap();
        assert!(frame.payload.len() <= MAX_PAYLOAD_SIZE);
        assert_eq!(
            ControllerMessage::from_frame(&frame),
            Ok(ControllerMessage::Status(report))
        );
    }

    #[test]
    fn test_empty_controller_messages() {
        assert_eq!(ControllerMessage::Pong.to_frame().unwrap().msg_type, MSG_PONG);
        assert_eq!(
            ControllerMessage::TimeRequest.to_frame().unwrap().msg_type,
            MSG_TIME_REQUEST
        );
    }
}
