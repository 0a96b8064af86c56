//! Minute-resolution time of day

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Hour and minute on the local 24 hour clock
///
/// Always valid: hour in 0..=23, minute in 0..=59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    /// Create a time of day, `None` if hour or minute is out of range
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since midnight
    pub const fn minutes_of_day(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Build from minutes since midnight, wrapping past a full day
    pub const fn from_minutes_of_day(minutes: u16) -> Self {
        let minutes = minutes % MINUTES_PER_DAY;
        Self {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        }
    }

    /// Build from seconds since midnight (seconds are truncated)
    ///
    /// Returns `None` for values of a full day or more.
    pub const fn from_seconds_of_day(seconds: u32) -> Option<Self> {
        if seconds >= SECONDS_PER_DAY {
            return None;
        }
        Some(Self::from_minutes_of_day((seconds / 60) as u16))
    }

    /// The time `minutes` earlier, borrowing hours and wrapping past midnight
    pub const fn minus_minutes(self, minutes: u16) -> Self {
        let minutes = minutes % MINUTES_PER_DAY;
        Self::from_minutes_of_day(self.minutes_of_day() + MINUTES_PER_DAY - minutes)
    }

    /// Parse `"HH:MM"`
    pub fn parse(s: &str) -> Option<Self> {
        let (hour, minute) = s.trim().split_once(':')?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return None;
        }
        Self::new(hour.parse().ok()?, minute.parse().ok()?)
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
