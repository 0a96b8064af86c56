//! Events that trigger state transitions

use super::machine::MoveKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Motor commanded toward a new target
    MoveStarted(MoveKind),
    /// Move reached its target, timed out, or was released
    MoveEnded,
    /// Emergency stop pressed on the dashboard
    EmergencyStopRequested,
    /// Controller observed and consumed the emergency stop
    StopObserved,
}
