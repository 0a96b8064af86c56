//! Bridge Link Protocol
//!
//! This crate defines the UART protocol between the blind controller (RP2040)
//! and the network bridge, a co-processor that runs the cloud dashboard client
//! and keeps network time. The bridge forwards dashboard virtual pin writes and
//! wall clock time; the controller answers with status reports.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬───────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CRC-8 │
//! │ 1B    │ 1B     │ 1B   │ 0–64B       │ 1B    │
//! └───────┴────────┴──────┴─────────────┴───────┘
//! ```
//!
//! The bridge owns Wi-Fi, authentication and NTP. The controller never
//! talks to the network directly.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod frame;
pub mod messages;
pub mod pins;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
pub use messages::{BridgeMessage, ControllerMessage, ReportedState, StatusReport};
pub use pins::{PinValue, PinWrite, VirtualPin};
