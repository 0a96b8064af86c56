//! Schedule times and once-per-day flags

use crate::clock::TimeOfDay;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPEN_TIME: TimeOfDay = match TimeOfDay::new(7, 0) {
    Some(t) => t,
    None => TimeOfDay::MIDNIGHT,
};

pub const DEFAULT_CLOSE_TIME: TimeOfDay = match TimeOfDay::new(20, 0) {
    Some(t) => t,
    None => TimeOfDay::MIDNIGHT,
};

/// Daily open and close times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    pub open: TimeOfDay,
    pub close: TimeOfDay,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN_TIME,
            close: DEFAULT_CLOSE_TIME,
        }
    }
}

/// Flags gating the once-per-day actions
///
/// All three clear at local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailyFlags {
    pub opened_today: bool,
    pub closed_today: bool,
    pub gradual_started: bool,
}

impl DailyFlags {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
