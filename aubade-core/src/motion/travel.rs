//! Travel geometry and move parameters
//!
//! Full travel and maximum speed depend on the blind and must come from
//! configuration; everything else has a default.

use crate::state::{ManualDirection, MoveKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default share of full travel used by the gradual pre-open
pub const DEFAULT_GRADUAL_PERCENT: u8 = 5;

/// Default acceleration in steps/s²
pub const DEFAULT_ACCEL_SPS2: u16 = 50;

/// Default move timeout (10 minutes)
pub const DEFAULT_MOVE_TIMEOUT_MS: u32 = 10 * 60 * 1000;

/// Default relative distance for hold-to-run moves
pub const DEFAULT_MANUAL_JOG_STEPS: u32 = 1_000_000;

/// Blind travel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TravelConfig {
    /// Steps between fully closed and fully open
    pub full_travel_steps: u32,
    /// Share of full travel reached by the gradual pre-open (percent)
    pub gradual_percent: u8,
    /// Speed cap for ordinary moves in steps/s
    pub max_speed_sps: u16,
    /// Speed cap for the gradual pre-open; `None` uses `max_speed_sps`
    pub gradual_speed_sps: Option<u16>,
    /// Acceleration in steps/s²
    pub accel_sps2: u16,
    /// Moves are abandoned after this long
    pub move_timeout_ms: u32,
    /// Relative distance of a hold-to-run move
    pub manual_jog_steps: u32,
}

impl TravelConfig {
    /// Create a travel config from the two calibration values
    pub fn new(full_travel_steps: u32, max_speed_sps: u16) -> Self {
        Self {
            full_travel_steps,
            gradual_percent: DEFAULT_GRADUAL_PERCENT,
            max_speed_sps,
            gradual_speed_sps: None,
            accel_sps2: DEFAULT_ACCEL_SPS2,
            move_timeout_ms: DEFAULT_MOVE_TIMEOUT_MS,
            manual_jog_steps: DEFAULT_MANUAL_JOG_STEPS,
        }
    }

    /// Fully open position
    pub fn open_position(&self) -> i32 {
        -(self.full_travel_steps.min(i32::MAX as u32) as i32)
    }

    /// Fully closed position
    pub fn closed_position(&self) -> i32 {
        0
    }

    /// Gradual pre-open position, truncated toward closed
    pub fn gradual_position(&self) -> i32 {
        (self.open_position() as i64 * self.gradual_percent as i64 / 100) as i32
    }

    /// Target position for a move starting at `position`
    pub fn target_for(&self, kind: MoveKind, position: i32) -> i32 {
        let jog = self.manual_jog_steps.min(i32::MAX as u32) as i32;
        match kind {
            MoveKind::GradualOpen => self.gradual_position(),
            MoveKind::FullOpen => self.open_position(),
            MoveKind::FullClose => self.closed_position(),
            MoveKind::Manual(ManualDirection::Up) => position.saturating_sub(jog),
            MoveKind::Manual(ManualDirection::Down) => position.saturating_add(jog),
        }
    }

    /// Speed cap for a move
    pub fn speed_for(&self, kind: MoveKind) -> u16 {
        match kind {
            MoveKind::GradualOpen => self.gradual_speed_sps.unwrap_or(self.max_speed_sps),
            _ => self.max_speed_sps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let travel = TravelConfig::new(90_845, 150);
        assert_eq!(travel.open_position(), -90_845);
        assert_eq!(travel.closed_position(), 0);
        // 5% of 90845 is 4542.25
        assert_eq!(travel.gradual_position(), -4_542);
    }

    #[test]
    fn test_alternate_calibration() {
        let travel = TravelConfig::new(70_260, 150);
        assert_eq!(travel.gradual_position(), -3_513);
    }

    #[test]
    fn test_manual_targets_are_relative() {
        let travel = TravelConfig::new(90_845, 150);
        let up = MoveKind::Manual(ManualDirection::Up);
        let down = MoveKind::Manual(ManualDirection::Down);
        assert_eq!(travel.target_for(up, -100), -1_000_100);
        assert_eq!(travel.target_for(down, -100), 999_900);
        assert_eq!(travel.target_for(down, i32::MAX - 5), i32::MAX);
    }

    #[test]
    fn test_absolute_targets_ignore_position() {
        let travel = TravelConfig::new(90_845, 150);
        assert_eq!(travel.target_for(MoveKind::FullOpen, 1_234), -90_845);
        assert_eq!(travel.target_for(MoveKind::FullClose, -1_234), 0);
        assert_eq!(travel.target_for(MoveKind::GradualOpen, 0), -4_542);
    }

    #[test]
    fn test_gradual_speed() {
        let mut travel = TravelConfig::new(90_845, 150);
        assert_eq!(travel.speed_for(MoveKind::GradualOpen), 150);
        travel.gradual_speed_sps = Some(10);
        assert_eq!(travel.speed_for(MoveKind::GradualOpen), 10);
        assert_eq!(travel.speed_for(MoveKind::FullOpen), 150);
    }
}
