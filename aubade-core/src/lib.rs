//! Board-agnostic core logic for the window blind firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Wall clock and time-of-day arithmetic
//! - Daily schedule evaluation (gradual pre-open, open, close, midnight reset)
//! - Blind state machine
//! - Motion planning and move execution with timeout
//! - Safety monitoring (emergency stop latch, bridge link health)
//! - Remote command decoding
//! - Configuration types and the embedded config parser
//! - The blind controller tying it all together

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod config;
pub mod controller;
pub mod motion;
pub mod remote;
pub mod safety;
pub mod schedule;
pub mod state;
pub mod traits;
