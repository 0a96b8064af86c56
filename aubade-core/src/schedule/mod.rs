//! Daily schedule
//!
//! Decides, once per check interval, whether the blind should begin its
//! gradual pre-open, open fully, close, or reset its daily flags.

pub mod daily;
pub mod evaluator;

pub use daily::{DailyFlags, Schedule, DEFAULT_CLOSE_TIME, DEFAULT_OPEN_TIME};
pub use evaluator::{ScheduleEvaluator, ScheduledAction, DEFAULT_GRADUAL_LEAD_MIN, MAX_ACTIONS};
