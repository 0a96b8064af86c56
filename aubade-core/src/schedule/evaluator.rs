//! Schedule rule evaluation
//!
//! Rules are checked independently on every tick, in this order:
//!
//! 1. gradual start, not opened, gradual not started: start the gradual open
//! 2. open time, not opened: open fully, clear closed and gradual
//! 3. close time, not closed: close fully, clear opened
//! 4. midnight: clear all flags
//!
//! Matching is exact on hour and minute. A minute that is never observed
//! (clock not synced, controller busy) is not caught up later.

use heapless::Vec;

use super::daily::{DailyFlags, Schedule};
use crate::clock::TimeOfDay;

/// Gradual opening starts this many minutes before the open time
pub const DEFAULT_GRADUAL_LEAD_MIN: u8 = 5;

/// Upper bound on actions produced by a single evaluation
pub const MAX_ACTIONS: usize = 4;

/// Actions triggered by the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduledAction {
    /// Partial pre-open ahead of the open time
    GradualOpen,
    /// Open to the full-travel position
    FullOpen,
    /// Close to position zero
    FullClose,
    /// Daily flags cleared
    MidnightReset,
}

/// Evaluates the daily schedule against wall clock time
#[derive(Debug, Clone)]
pub struct ScheduleEvaluator {
    schedule: Schedule,
    flags: DailyFlags,
    gradual_lead_min: u8,
}

impl Default for ScheduleEvaluator {
    fn default() -> Self {
        Self::new(Schedule::default())
    }
}

impl ScheduleEvaluator {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            flags: DailyFlags::default(),
            gradual_lead_min: DEFAULT_GRADUAL_LEAD_MIN,
        }
    }

    pub fn with_gradual_lead(mut self, minutes: u8) -> Self {
        self.gradual_lead_min = minutes;
        self
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    pub fn flags(&self) -> DailyFlags {
        self.flags
    }

    /// Time at which the gradual pre-open fires
    pub fn gradual_start(&self) -> TimeOfDay {
        self.schedule.open.minus_minutes(self.gradual_lead_min as u16)
    }

    /// Change the open time; the new time may fire again today
    pub fn set_open_time(&mut self, time: TimeOfDay) {
        self.schedule.open = time;
        self.flags.opened_today = false;
    }

    /// Change the close time; the new time may fire again today
    pub fn set_close_time(&mut self, time: TimeOfDay) {
        self.schedule.close = time;
        self.flags.closed_today = false;
    }

    /// Apply the rules for the current time of day
    pub fn evaluate(&mut self, now: TimeOfDay) -> Vec<ScheduledAction, MAX_ACTIONS> {
        let mut actions = Vec::new();

        if now == self.gradual_start() && !self.flags.opened_today && !self.flags.gradual_started
        {
            self.flags.gradual_started = true;
            let _ = actions.push(ScheduledAction::GradualOpen);
        }

        if now == self.schedule.open && !self.flags.opened_today {
            self.flags.opened_today = true;
            self.flags.closed_today = false;
            self.flags.gradual_started = false;
            let _ = actions.push(ScheduledAction::FullOpen);
        }

        if now == self.schedule.close && !self.flags.closed_today {
            self.flags.closed_today = true;
            self.flags.opened_today = false;
            let _ = actions.push(ScheduledAction::FullClose);
        }

        if now == TimeOfDay::MIDNIGHT {
            self.flags.clear();
            let _ = actions.push(ScheduledAction::MidnightReset);
        }

        actions
    }
}
