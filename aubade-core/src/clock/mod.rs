//! Wall clock and time-of-day arithmetic
//!
//! The controller has no RTC. Local time is derived from epoch seconds
//! pushed by the network bridge, advanced by the monotonic clock between
//! syncs.

pub mod time;
pub mod wall;

pub use time::{TimeOfDay, MINUTES_PER_DAY, SECONDS_PER_DAY};
pub use wall::{ClockError, WallClock};
