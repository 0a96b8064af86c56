//! Network-synchronized wall clock
//!
//! The bridge answers time requests with Unix epoch seconds (UTC). Between
//! syncs the clock free-runs on the monotonic millisecond counter.

use super::time::{TimeOfDay, SECONDS_PER_DAY};

/// Default offset from UTC (central European time)
pub const DEFAULT_UTC_OFFSET_S: i32 = 3600;

/// Default daylight saving offset
pub const DEFAULT_DST_OFFSET_S: i32 = 3600;

/// Re-sync with network time every hour
pub const DEFAULT_RESYNC_INTERVAL_MS: u32 = 60 * 60 * 1000;

/// Minimum spacing between unanswered time requests
pub const DEFAULT_RETRY_INTERVAL_MS: u32 = 10_000;

/// Clock errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// No network time has been received yet
    NotSynced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncPoint {
    epoch_s: u32,
    at_ms: u64,
}

/// Local wall clock derived from network time
#[derive(Debug, Clone)]
pub struct WallClock {
    utc_offset_s: i32,
    dst_offset_s: i32,
    resync_interval_ms: u32,
    retry_interval_ms: u32,
    last_sync: Option<SyncPoint>,
    last_request_ms: Option<u64>,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new(DEFAULT_UTC_OFFSET_S, DEFAULT_DST_OFFSET_S)
    }
}

impl WallClock {
    /// Create an unsynced clock with the given offsets
    pub fn new(utc_offset_s: i32, dst_offset_s: i32) -> Self {
        Self {
            utc_offset_s,
            dst_offset_s,
            resync_interval_ms: DEFAULT_RESYNC_INTERVAL_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            last_sync: None,
            last_request_ms: None,
        }
    }

    /// Override the resync and retry intervals
    pub fn with_intervals(mut self, resync_interval_ms: u32, retry_interval_ms: u32) -> Self {
        self.resync_interval_ms = resync_interval_ms;
        self.retry_interval_ms = retry_interval_ms;
        self
    }

    /// Record network time received at monotonic time `now_ms`
    pub fn sync(&mut self, epoch_s: u32, now_ms: u64) {
        self.last_sync = Some(SyncPoint {
            epoch_s,
            at_ms: now_ms,
        });
        self.last_request_ms = None;
    }

    /// Whether network time has been received at least once
    pub fn is_synced(&self) -> bool {
        self.last_sync.is_some()
    }

    /// Current UTC epoch seconds
    pub fn epoch_seconds(&self, now_ms: u64) -> Result<u64, ClockError> {
        let sync = self.last_sync.ok_or(ClockError::NotSynced)?;
        let elapsed_s = now_ms.saturating_sub(sync.at_ms) / 1000;
        Ok(sync.epoch_s as u64 + elapsed_s)
    }

    /// Current local time of day
    pub fn local_time(&self, now_ms: u64) -> Result<TimeOfDay, ClockError> {
        let utc = self.epoch_seconds(now_ms)? as i64;
        let local = utc + self.utc_offset_s as i64 + self.dst_offset_s as i64;
        let seconds_of_day = local.rem_euclid(SECONDS_PER_DAY as i64) as u32;
        TimeOfDay::from_seconds_of_day(seconds_of_day).ok_or(ClockError::NotSynced)
    }

    /// Whether a time request should go out now
    ///
    /// Due when the clock was never synced or the last sync is older than
    /// the resync interval. Unanswered requests are repeated no faster than
    /// the retry interval. Records the request when returning `true`.
    pub fn poll_resync(&mut self, now_ms: u64) -> bool {
        let due = match self.last_sync {
            None => true,
            Some(sync) => now_ms.saturating_sub(sync.at_ms) >= self.resync_interval_ms as u64,
        };
        if !due {
            return false;
        }

        match self.last_request_ms {
            Some(at) if now_ms.saturating_sub(at) < self.retry_interval_ms as u64 => false,
            _ => {
                self.last_request_ms = Some(now_ms);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14T22:13:20Z
    const EPOCH: u32 = 1_700_000_000;

    #[test]
    fn test_unsynced_clock() {
        let clock = WallClock::default();
        assert!(!clock.is_synced());
        assert_eq!(clock.local_time(0), Err(ClockError::NotSynced));
    }

    #[test]
    fn test_local_time_applies_offsets() {
        let mut clock = WallClock::default();
        clock.sync(EPOCH, 0);
        // 22:13 UTC + 2h
        assert_eq!(clock.local_time(0), Ok(TimeOfDay::new(0, 13).unwrap()));

        let mut utc = WallClock::new(0, 0);
        utc.sync(EPOCH, 0);
        assert_eq!(utc.local_time(0), Ok(TimeOfDay::new(22, 13).unwrap()));
    }

    #[test]
    fn test_negative_offset_wraps_backwards() {
        let mut clock = WallClock::new(-5 * 3600, 0);
        // 1970-01-01T02:00:00Z
        clock.sync(7200, 0);
        assert_eq!(clock.local_time(0), Ok(TimeOfDay::new(21, 0).unwrap()));
    }

    #[test]
    fn test_clock_advances_between_syncs() {
        let mut clock = WallClock::new(0, 0);
        clock.sync(EPOCH, 1_000);
        // 46 s later crosses into 22:14
        assert_eq!(clock.local_time(47_000), Ok(TimeOfDay::new(22, 14).unwrap()));
        assert_eq!(clock.epoch_seconds(47_000), Ok(EPOCH as u64 + 46));
    }

    #[test]
    fn test_resync_requested_until_synced() {
        let mut clock = WallClock::default();
        assert!(clock.poll_resync(0));
        assert!(!clock.poll_resync(5_000));
        assert!(clock.poll_resync(10_000));

        clock.sync(EPOCH, 12_000);
        assert!(!clock.poll_resync(13_000));
    }

    #[test]
    fn test_hourly_resync() {
        let mut clock = WallClock::default();
        clock.sync(EPOCH, 0);
        assert!(!clock.poll_resync(DEFAULT_RESYNC_INTERVAL_MS as u64 - 1));
        assert!(clock.poll_resync(DEFAULT_RESYNC_INTERVAL_MS as u64));
        // Failed resync keeps the old sync point running
        assert!(clock.local_time(DEFAULT_RESYNC_INTERVAL_MS as u64 + 60_000).is_ok());
    }
}
