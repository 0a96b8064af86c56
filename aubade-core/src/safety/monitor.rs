//! Safety monitor implementation

/// Default time without a bridge ping before one heartbeat counts as missed
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u32 = 3000;

/// Missed heartbeats before the link is considered lost
pub const MAX_MISSED_HEARTBEATS: u8 = 3;

/// Fault conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Emergency stop requested and not yet observed
    EmergencyStop,
    /// Bridge stopped sending heartbeats
    LinkLost,
}

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultKind),
}

/// Safety monitor for fault detection
///
/// Link loss is reported but never stops the schedule; the blind keeps
/// following its last known times on the free-running clock.
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    /// Emergency stop latched, cleared when observed
    estop_latched: bool,
    heartbeat_timeout_ms: u32,
    /// Missed heartbeat count
    missed_heartbeats: u8,
    /// Time since last heartbeat (ms)
    time_since_heartbeat_ms: u32,
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_TIMEOUT_MS)
    }
}

impl SafetyMonitor {
    pub fn new(heartbeat_timeout_ms: u32) -> Self {
        Self {
            estop_latched: false,
            heartbeat_timeout_ms,
            missed_heartbeats: 0,
            time_since_heartbeat_ms: 0,
        }
    }

    /// Latch an emergency stop
    pub fn request_emergency_stop(&mut self) {
        self.estop_latched = true;
    }

    /// Observe the emergency stop latch, clearing it
    ///
    /// Returns `true` exactly once per request.
    pub fn take_emergency_stop(&mut self) -> bool {
        core::mem::replace(&mut self.estop_latched, false)
    }

    /// Record a heartbeat received
    pub fn heartbeat_received(&mut self) {
        self.missed_heartbeats = 0;
        self.time_since_heartbeat_ms = 0;
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        self.time_since_heartbeat_ms = self.time_since_heartbeat_ms.saturating_add(delta_ms);

        if self.time_since_heartbeat_ms >= self.heartbeat_timeout_ms {
            self.missed_heartbeats = self.missed_heartbeats.saturating_add(1);
            self.time_since_heartbeat_ms = 0;
        }
    }

    /// Check all safety conditions
    ///
    /// Returns the first fault detected, or Ok if all conditions are normal.
    pub fn check(&self) -> SafetyStatus {
        if self.estop_latched {
            return SafetyStatus::Fault(FaultKind::EmergencyStop);
        }

        if !self.is_link_healthy() {
            return SafetyStatus::Fault(FaultKind::LinkLost);
        }

        SafetyStatus::Ok
    }

    /// Check if link is healthy
    pub fn is_link_healthy(&self) -> bool {
        self.missed_heartbeats < MAX_MISSED_HEARTBEATS
    }

    /// Get number of missed heartbeats
    pub fn missed_heartbeats(&self) -> u8 {
        self.missed_heartbeats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_operation() {
        let monitor = SafetyMonitor::default();
        assert_eq!(monitor.check(), SafetyStatus::Ok);
    }

    #[test]
    fn test_emergency_stop_observed_once() {
        let mut monitor = SafetyMonitor::default();
        monitor.request_emergency_stop();
        assert_eq!(
            monitor.check(),
            SafetyStatus::Fault(FaultKind::EmergencyStop)
        );

        assert!(monitor.take_emergency_stop());
        assert!(!monitor.take_emergency_stop());
        assert_eq!(monitor.check(), SafetyStatus::Ok);
    }

    #[test]
    fn test_link_lost() {
        let mut monitor = SafetyMonitor::default();

        // Miss 3 heartbeats
        for _ in 0..3 {
            monitor.update_time(DEFAULT_HEARTBEAT_TIMEOUT_MS);
        }

        assert_eq!(monitor.check(), SafetyStatus::Fault(FaultKind::LinkLost));
    }

    #[test]
    fn test_heartbeat_resets_counter() {
        let mut monitor = SafetyMonitor::default();

        // Miss 2 heartbeats
        monitor.update_time(DEFAULT_HEARTBEAT_TIMEOUT_MS);
        monitor.update_time(DEFAULT_HEARTBEAT_TIMEOUT_MS);
        assert_eq!(monitor.missed_heartbeats(), 2);

        // Receive heartbeat
        monitor.heartbeat_received();
        assert_eq!(monitor.missed_heartbeats(), 0);
        assert!(monitor.is_link_healthy());
    }

    #[test]
    fn test_emergency_stop_reported_before_link() {
        let mut monitor = SafetyMonitor::new(100);
        for _ in 0..3 {
            monitor.update_time(100);
        }
        monitor.request_emergency_stop();
        assert_eq!(
            monitor.check(),
            SafetyStatus::Fault(FaultKind::EmergencyStop)
        );
    }
}
