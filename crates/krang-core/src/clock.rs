//! Wall clock for boards without a real-time clock.

use chrono::{DateTime, NaiveDateTime};
use log::warn;

/// Local time derived from a base epoch plus monotonic uptime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WallClock {
    base_epoch: i64,
    last_second: Option<i64>,
}

impl WallClock {
    /// `base_epoch` is the local time, in seconds, at zero uptime.
    pub const fn new(base_epoch: i64) -> Self {
        Self {
            base_epoch,
            last_second: None,
        }
    }

    /// Returns the local time and the whole seconds elapsed since the last
    /// reported tick, once per second boundary. The first call reports one
    /// second.
    pub fn poll(&mut self, uptime_secs: u64) -> Option<(NaiveDateTime, i32)> {
        let second = self
            .base_epoch
            .saturating_add(uptime_secs.min(i64::MAX as u64) as i64);
        let elapsed = match self.last_second {
            Some(last) if second <= last => return None,
            Some(last) => (second - last).min(i32::MAX as i64) as i32,
            None => 1,
        };
        self.last_second = Some(second);

        match DateTime::from_timestamp(second, 0) {
            Some(time) => Some((time.naive_utc(), elapsed)),
            None => {
                warn!("clock: epoch {} out of range", second);
                None
            }
        }
    }
}
