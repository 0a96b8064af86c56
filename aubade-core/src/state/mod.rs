//! Blind state machine
//!
//! The blind is always in exactly one state. Overlapping triggers are
//! resolved by the controller before they reach the machine.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ManualDirection, MoveKind, State};
