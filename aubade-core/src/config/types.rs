//! Configuration type definitions

use crate::clock::wall::{DEFAULT_DST_OFFSET_S, DEFAULT_RESYNC_INTERVAL_MS, DEFAULT_UTC_OFFSET_S};
use crate::motion::TravelConfig;
use crate::safety::monitor::DEFAULT_HEARTBEAT_TIMEOUT_MS;
use crate::schedule::{Schedule, DEFAULT_GRADUAL_LEAD_MIN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default schedule check interval
pub const DEFAULT_CHECK_INTERVAL_MS: u32 = 10_000;

/// Default steps per output shaft revolution (28BYJ-48, full step)
pub const DEFAULT_STEPS_PER_REVOLUTION: u16 = 2048;

/// Default bridge UART baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default interval between status reports to the bridge
pub const DEFAULT_STATUS_INTERVAL_MS: u32 = 10_000;

/// Schedule section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleConfig {
    /// Initial open and close times (the dashboard can change them)
    pub schedule: Schedule,
    /// Minutes between the gradual pre-open and the open time
    pub gradual_lead_min: u8,
    /// Interval between schedule evaluations
    pub check_interval_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            schedule: Schedule::default(),
            gradual_lead_min: DEFAULT_GRADUAL_LEAD_MIN,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
        }
    }
}

/// Stepper motor hardware section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// Full steps per output shaft revolution
    pub steps_per_revolution: u16,
    /// Swap the coil sequence direction
    pub invert_direction: bool,
    /// De-energize the coils between moves
    pub release_when_idle: bool,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            invert_direction: false,
            release_when_idle: true,
        }
    }
}

/// Wall clock section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    pub utc_offset_s: i32,
    pub dst_offset_s: i32,
    pub resync_interval_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_s: DEFAULT_UTC_OFFSET_S,
            dst_offset_s: DEFAULT_DST_OFFSET_S,
            resync_interval_ms: DEFAULT_RESYNC_INTERVAL_MS,
        }
    }
}

/// Bridge link section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    pub baud_rate: u32,
    /// Time without a ping before a heartbeat counts as missed
    pub heartbeat_timeout_ms: u32,
    /// Interval between status reports
    pub status_interval_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            heartbeat_timeout_ms: DEFAULT_HEARTBEAT_TIMEOUT_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Full travel must be at least one step
    ZeroTravel,
    /// Speed caps must be non-zero
    ZeroSpeed,
    /// Acceleration must be non-zero
    ZeroAcceleration,
    /// Gradual share must be 0-100 percent
    GradualPercentOutOfRange,
    /// Gradual lead must be shorter than an hour
    GradualLeadOutOfRange,
    /// Intervals and timeouts must be non-zero
    ZeroInterval,
    /// Steps per revolution must be non-zero
    ZeroStepsPerRevolution,
}

/// Complete blind configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlindConfig {
    pub schedule: ScheduleConfig,
    pub travel: TravelConfig,
    pub motor: MotorConfig,
    pub clock: ClockConfig,
    pub bridge: BridgeConfig,
}

impl BlindConfig {
    /// Configuration with the given travel calibration and defaults elsewhere
    pub fn new(travel: TravelConfig) -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            travel,
            motor: MotorConfig::default(),
            clock: ClockConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }

    /// Full travel in tenths of an output shaft revolution
    pub fn travel_revolutions_x10(&self) -> u32 {
        let per_rev = u64::from(self.motor.steps_per_revolution.max(1));
        let tenths = (u64::from(self.travel.full_travel_steps) * 10 + per_rev / 2) / per_rev;
        tenths.min(u64::from(u32::MAX)) as u32
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let travel = &self.travel;
        if travel.full_travel_steps == 0 || travel.full_travel_steps > i32::MAX as u32 {
            return Err(ConfigError::ZeroTravel);
        }
        if travel.max_speed_sps == 0 || travel.gradual_speed_sps == Some(0) {
            return Err(ConfigError::ZeroSpeed);
        }
        if travel.accel_sps2 == 0 {
            return Err(ConfigError::ZeroAcceleration);
        }
        if travel.gradual_percent > 100 {
            return Err(ConfigError::GradualPercentOutOfRange);
        }
        if self.motor.steps_per_revolution == 0 {
            return Err(ConfigError::ZeroStepsPerRevolution);
        }
        if self.schedule.gradual_lead_min >= 60 {
            return Err(ConfigError::GradualLeadOutOfRange);
        }
        if travel.move_timeout_ms == 0
            || self.schedule.check_interval_ms == 0
            || self.clock.resync_interval_ms == 0
            || self.bridge.heartbeat_timeout_ms == 0
            || self.bridge.status_interval_ms == 0
            || self.bridge.baud_rate == 0
        {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = BlindConfig::new(TravelConfig::new(90_845, 150));
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.schedule.check_interval_ms, 10_000);
        assert_eq!(config.clock.utc_offset_s, 3600);
        assert_eq!(config.clock.dst_offset_s, 3600);
        assert_eq!(config.motor.steps_per_revolution, 2048);
    }

    #[test]
    fn test_rejects_zero_travel() {
        let config = BlindConfig::new(TravelConfig::new(0, 150));
        assert_eq!(config.validate(), Err(ConfigError::ZeroTravel));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let config = BlindConfig::new(TravelConfig::new(90_845, 0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpeed));

        let mut config = BlindConfig::new(TravelConfig::new(90_845, 150));
        config.travel.gradual_speed_sps = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpeed));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let mut config = BlindConfig::new(TravelConfig::new(90_845, 150));
        config.travel.gradual_percent = 101;
        assert_eq!(
            config.validate(),
            Err(ConfigError::GradualPercentOutOfRange)
        );

        let mut config = BlindConfig::new(TravelConfig::new(90_845, 150));
        config.schedule.gradual_lead_min = 60;
        assert_eq!(config.validate(), Err(ConfigError::GradualLeadOutOfRange));

        let mut config = BlindConfig::new(TravelConfig::new(90_845, 150));
        config.travel.move_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));

        let mut config = BlindConfig::new(TravelConfig::new(90_845, 150));
        config.motor.steps_per_revolution = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroStepsPerRevolution));
    }

    #[test]
    fn test_travel_revolutions() {
        // 90845 / 2048 = 44.36 turns
        let config = BlindConfig::new(TravelConfig::new(90_845, 150));
        assert_eq!(config.travel_revolutions_x10(), 444);

        let mut config = BlindConfig::new(TravelConfig::new(4096, 150));
        config.motor.steps_per_revolution = 4096;
        assert_eq!(config.travel_revolutions_x10(), 10);
    }
}
