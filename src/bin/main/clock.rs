use chrono::NaiveDateTime;
use esp_hal::time::Instant;

include!(concat!(env!("OUT_DIR"), "/build_time.rs"));

/// Local offset applied to the build-stamped UTC clock.
pub const TIMEZONE_OFFSET_SECS: i64 = 0;

/// Build-stamped [`krang_core::clock::WallClock`] driven by the system timer.
#[derive(Debug)]
pub struct BoardClock {
    wall: krang_core::clock::WallClock,
    started: Instant,
}

impl BoardClock {
    pub fn from_build_time() -> Self {
        Self {
            wall: krang_core::clock::WallClock::new(BUILD_UTC_EPOCH + TIMEZONE_OFFSET_SECS),
            started: Instant::now(),
        }
    }

    pub fn poll_tick(&mut self) -> Option<(NaiveDateTime, i32)> {
        self.wall.poll(self.started.elapsed().as_secs())
    }
}
