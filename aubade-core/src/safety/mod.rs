//! Safety monitoring
//!
//! Latches emergency stops and watches the bridge link.

pub mod monitor;

pub use monitor::{FaultKind, SafetyMonitor, SafetyStatus};
