#[cfg(test)]
use std::cell::Cell;

use chrono::{DateTime, Duration, Local, Timelike};

/// Wall-clock access for the frame loop. Samples have whole-second
/// resolution, like a broken-down calendar time.
pub trait TimeSource {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Local> {
        let now = Local::now();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    current: Cell<DateTime<Local>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.current.set(offset(self.current.get(), seconds));
    }
}

#[cfg(test)]
impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.current.get()
    }
}

/// Shifts `base` by `seconds` on the absolute timeline; calendar fields are
/// re-derived for the local zone so the result is always a valid local time.
pub fn offset<Tz: chrono::TimeZone>(base: DateTime<Tz>, seconds: i64) -> DateTime<Tz> {
    base + Duration::seconds(seconds)
}

/// `b - a` in seconds.
pub fn diff_seconds<Tz: chrono::TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> f64 {
    let delta = b.clone().signed_duration_since(a.clone());
    delta.num_milliseconds() as f64 / 1_000.0
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone};
    use chrono_tz::America::New_York;

    use super::*;

    #[test]
    fn system_clock_has_whole_second_resolution() {
        let sample = SystemClock.now();
        assert_eq!(sample.nanosecond(), 0);
    }

    #[test]
    fn offset_then_diff_returns_the_offset() {
        let base = Local::now();
        for seconds in [0, 1, 10, 600, 3_600, 5 * 3_600, 86_400 * 40] {
            let shifted = offset(base, seconds);
            assert_eq!(diff_seconds(&base, &shifted), seconds as f64);
        }
    }

    #[test]
    fn offset_rolls_over_month_and_year() {
        let base = New_York
            .with_ymd_and_hms(2025, 12, 31, 23, 59, 55)
            .single()
            .expect("valid");
        let shifted = offset(base, 10);
        assert_eq!(shifted.year(), 2026);
        assert_eq!(shifted.month(), 1);
        assert_eq!(shifted.day(), 1);
        assert_eq!(shifted.second(), 5);
    }

    #[test]
    fn offset_across_spring_forward_keeps_elapsed_seconds() {
        let base = New_York
            .with_ymd_and_hms(2026, 3, 8, 1, 30, 0)
            .single()
            .expect("valid");
        let shifted = offset(base, 3_600);
        // 02:30 does not exist that night; one real hour later reads 03:30.
        assert_eq!(shifted.hour(), 3);
        assert_eq!(shifted.minute(), 30);
        assert_eq!(diff_seconds(&base, &shifted), 3_600.0);
    }

    #[test]
    fn diff_is_negative_when_target_is_behind() {
        let base = Local::now();
        let earlier = offset(base, -5);
        assert_eq!(diff_seconds(&base, &earlier), -5.0);
    }

    #[test]
    fn manual_clock_advances_on_request() {
        let start = Local::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(11);
        assert_eq!(diff_seconds(&start, &clock.now()), 11.0);
    }
}
