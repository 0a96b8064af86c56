//! Move execution with timeout
//!
//! Tracks the single active move. A move ends when the motor reaches its
//! target, when the timeout elapses, or when something else takes the
//! motor away (manual override, button release, emergency stop).

use crate::state::MoveKind;

/// How a move ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveResult {
    /// Target reached
    Reached,
    /// Timeout elapsed; abandoned where it stood
    TimedOut,
    /// Replaced by a manual move
    Preempted,
    /// Manual button released
    Released,
    /// Emergency stop
    Stopped,
}

/// Report of a finished move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveOutcome {
    pub kind: MoveKind,
    pub result: MoveResult,
    /// Position when the move ended
    pub position: i32,
    /// Time the move ran for
    pub elapsed_ms: u64,
}

/// The move currently driving the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveMove {
    pub kind: MoveKind,
    pub target: i32,
    pub started_ms: u64,
}

/// Tracks the active move and enforces the timeout
#[derive(Debug, Clone)]
pub struct MoveExecutor {
    active: Option<ActiveMove>,
    timeout_ms: u32,
}

impl MoveExecutor {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            active: None,
            timeout_ms,
        }
    }

    pub fn active(&self) -> Option<&ActiveMove> {
        self.active.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Start a move, preempting any move in progress
    ///
    /// Returns the outcome of the preempted move.
    pub fn start(
        &mut self,
        kind: MoveKind,
        target: i32,
        position: i32,
        now_ms: u64,
    ) -> Option<MoveOutcome> {
        let preempted = self.finish(MoveResult::Preempted, position, now_ms);
        self.active = Some(ActiveMove {
            kind,
            target,
            started_ms: now_ms,
        });
        preempted
    }

    /// Check the active move against the motor position and the clock
    pub fn check(&mut self, position: i32, now_ms: u64) -> Option<MoveOutcome> {
        let active = self.active?;
        if position == active.target {
            return self.finish(MoveResult::Reached, position, now_ms);
        }
        if now_ms.saturating_sub(active.started_ms) >= self.timeout_ms as u64 {
            return self.finish(MoveResult::TimedOut, position, now_ms);
        }
        None
    }

    /// End the active move for an external reason
    pub fn finish(&mut self, result: MoveResult, position: i32, now_ms: u64) -> Option<MoveOutcome> {
        let active = self.active.take()?;
        Some(MoveOutcome {
            kind: active.kind,
            result,
            position,
            elapsed_ms: now_ms.saturating_sub(active.started_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::travel::DEFAULT_MOVE_TIMEOUT_MS;
    use crate::state::ManualDirection;

    #[test]
    fn test_reached() {
        let mut exec = MoveExecutor::new(DEFAULT_MOVE_TIMEOUT_MS);
        assert!(exec.start(MoveKind::FullOpen, -500, 0, 1_000).is_none());
        assert!(exec.check(-250, 2_000).is_none());

        let outcome = exec.check(-500, 5_000).unwrap();
        assert_eq!(outcome.kind, MoveKind::FullOpen);
        assert_eq!(outcome.result, MoveResult::Reached);
        assert_eq!(outcome.elapsed_ms, 4_000);
        assert!(!exec.is_busy());
    }

    #[test]
    fn test_timeout_leaves_position() {
        let mut exec = MoveExecutor::new(DEFAULT_MOVE_TIMEOUT_MS);
        exec.start(MoveKind::FullOpen, -90_845, 0, 0);

        assert!(exec.check(-89_000, DEFAULT_MOVE_TIMEOUT_MS as u64 - 1).is_none());
        let outcome = exec.check(-89_100, DEFAULT_MOVE_TIMEOUT_MS as u64).unwrap();
        assert_eq!(outcome.result, MoveResult::TimedOut);
        assert_eq!(outcome.position, -89_100);
        assert!(!exec.is_busy());
        // No retry
        assert!(exec.check(-89_100, DEFAULT_MOVE_TIMEOUT_MS as u64 + 10_000).is_none());
    }

    #[test]
    fn test_timeout_applies_to_manual() {
        let mut exec = MoveExecutor::new(1_000);
        exec.start(MoveKind::Manual(ManualDirection::Down), 1_000_000, 0, 0);
        let outcome = exec.check(150, 1_000).unwrap();
        assert_eq!(outcome.result, MoveResult::TimedOut);
    }

    #[test]
    fn test_start_preempts() {
        let mut exec = MoveExecutor::new(DEFAULT_MOVE_TIMEOUT_MS);
        exec.start(MoveKind::FullClose, 0, -1_000, 0);

        let preempted = exec
            .start(MoveKind::Manual(ManualDirection::Up), -1_000_800, -800, 500)
            .unwrap();
        assert_eq!(preempted.kind, MoveKind::FullClose);
        assert_eq!(preempted.result, MoveResult::Preempted);
        assert_eq!(preempted.position, -800);
        assert_eq!(exec.active().unwrap().started_ms, 500);
    }

    #[test]
    fn test_finish_when_idle() {
        let mut exec = MoveExecutor::new(DEFAULT_MOVE_TIMEOUT_MS);
        assert!(exec.finish(MoveResult::Stopped, 0, 0).is_none());
    }
}
