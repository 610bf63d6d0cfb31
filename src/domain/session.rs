//! Trading Session Gate
//!
//! Regular-hours window evaluated in the exchange's time zone, daylight
//! saving included.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Exchange zone used when none is configured
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSession {
    /// Exchange time zone
    pub timezone: Tz,
    /// Session open as minutes after local midnight, inclusive
    pub open_minute: u32,
    /// Session close as minutes after local midnight, exclusive
    pub close_minute: u32,
    /// When false every timestamp counts as in-session
    pub enforce: bool,
}

impl MarketSession {
    pub fn new(timezone: Tz, open_minute: u32, close_minute: u32) -> Self {
        Self {
            timezone,
            open_minute,
            close_minute,
            enforce: true,
        }
    }

    /// Session that never closes
    pub fn always_open() -> Self {
        Self { enforce: false, ..Self::default() }
    }

    /// Monday to Friday, `open <= local time < close`
    pub fn is_open(&self, timestamp: DateTime<Utc>) -> bool {
        if !self.enforce {
            return true;
        }

        let local = timestamp.with_timezone(&self.timezone);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let minute_of_day = local.hour() * 60 + local.minute();
        minute_of_day >= self.open_minute && minute_of_day < self.close_minute
    }
}

impl Default for MarketSession {
    /// US equity-index regular hours, 09:30-16:00 New York time
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE, 9 * 60 + 30, 16 * 60)
    }
}

/// Parse "HH:MM" into minutes after midnight
pub fn parse_session_time(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_open_during_regular_hours() {
        let session = MarketSession::default();
        // Monday 2026-03-02 10:00 EST is 15:00 UTC
        assert!(session.is_open(utc(2026, 3, 2, 15, 0)));
        // 09:30 local is the first open minute
        assert!(session.is_open(utc(2026, 3, 2, 14, 30)));
    }

    #[test]
    fn test_closed_outside_hours() {
        let session = MarketSession::default();
        // 09:29 local
        assert!(!session.is_open(utc(2026, 3, 2, 14, 29)));
        // 16:00 local is closed
        assert!(!session.is_open(utc(2026, 3, 2, 21, 0)));
    }

    #[test]
    fn test_closed_on_weekend() {
        let session = MarketSession::default();
        // Saturday 2026-03-07 11:00 local
        assert!(!session.is_open(utc(2026, 3, 7, 16, 0)));
    }

    #[test]
    fn test_local_date_differs_from_utc() {
        // Tuesday 01:00 UTC is Monday 20:00 local: weekday but after the close
        let session = MarketSession::default();
        assert!(!session.is_open(utc(2026, 3, 3, 1, 0)));

        // Same instant inside an evening session that spans it
        let evening = MarketSession::new(DEFAULT_TIMEZONE, 18 * 60, 23 * 60);
        assert!(evening.is_open(utc(2026, 3, 3, 1, 0)));
    }

    #[test]
    fn test_summer_hours_follow_daylight_saving() {
        let session = MarketSession::default();
        // Monday 2026-07-06, New York is on EDT (UTC-4)
        // 13:30 UTC is 09:30 EDT
        assert!(session.is_open(utc(2026, 7, 6, 13, 30)));
        assert!(session.is_open(utc(2026, 7, 6, 13, 45)));
        assert!(!session.is_open(utc(2026, 7, 6, 13, 29)));
        // 20:00 UTC is 16:00 EDT
        assert!(session.is_open(utc(2026, 7, 6, 19, 59)));
        assert!(!session.is_open(utc(2026, 7, 6, 20, 0)));
        assert!(!session.is_open(utc(2026, 7, 6, 20, 30)));
    }

    #[test]
    fn test_other_exchange_zone() {
        // 08:30-15:00 Chicago
        let session = MarketSession::new(chrono_tz::America::Chicago, 8 * 60 + 30, 15 * 60);
        // Monday 2026-07-06 13:30 UTC is 08:30 CDT
        assert!(session.is_open(utc(2026, 7, 6, 13, 30)));
        // Monday 2026-01-05 14:29 UTC is 08:29 CST
        assert!(!session.is_open(utc(2026, 1, 5, 14, 29)));
    }

    #[test]
    fn test_unenforced_session_is_always_open() {
        let session = MarketSession::always_open();
        assert!(session.is_open(utc(2026, 3, 7, 16, 0)));
        assert!(session.is_open(utc(2026, 3, 2, 3, 0)));
    }

    #[test]
    fn test_parse_session_time() {
        assert_eq!(parse_session_time("09:30"), Some(570));
        assert_eq!(parse_session_time("16:00"), Some(960));
        assert_eq!(parse_session_time("24:00"), None);
        assert_eq!(parse_session_time("9h30"), None);
        assert_eq!(parse_session_time("12:60"), None);
    }
}
