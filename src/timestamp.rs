use chrono::{DateTime, Duration, Utc};

/// Seconds between the WebKit epoch (1601-01-01T00:00:00Z) and the Unix
/// epoch. Chrome stores visit times as microseconds since the WebKit epoch;
/// every timestamp in the history store goes through this constant, so a
/// wrong value here would shift every derived hour and weekday bucket.
pub const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Convert a raw Chrome visit timestamp (microseconds since 1601-01-01 UTC)
/// to absolute time. Returns `None` for values that don't map to a
/// representable instant (negative or absurdly large), which callers treat
/// as a malformed row.
pub fn webkit_to_utc(micros: i64) -> Option<DateTime<Utc>> {
    if micros < 0 {
        return None;
    }
    let unix_micros = micros.checked_sub(WEBKIT_EPOCH_OFFSET_SECS * 1_000_000)?;
    DateTime::from_timestamp_micros(unix_micros)
}

/// Convert an absolute time back to a raw Chrome visit timestamp. Used to
/// build the query cutoff.
pub fn utc_to_webkit(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros() + WEBKIT_EPOCH_OFFSET_SECS * 1_000_000
}

/// The inclusive time range one analysis run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the `days` days ending at `now`. "Now" is passed in
    /// explicitly rather than captured here so runs are reproducible.
    pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn webkit_offset_maps_to_unix_epoch() {
        // 11_644_473_600 seconds after 1601-01-01 is exactly the Unix epoch.
        let epoch = webkit_to_utc(WEBKIT_EPOCH_OFFSET_SECS * 1_000_000).unwrap();
        assert_eq!(epoch, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn webkit_known_timestamp() {
        // 13_100_000_000_000_000 µs = 1_455_526_400 Unix seconds.
        let t = webkit_to_utc(13_100_000_000_000_000).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2016, 2, 15, 8, 53, 20).unwrap());
    }

    #[test]
    fn webkit_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap();
        assert_eq!(webkit_to_utc(utc_to_webkit(t)), Some(t));
    }

    #[test]
    fn negative_timestamp_is_rejected() {
        assert_eq!(webkit_to_utc(-1), None);
    }

    #[test]
    fn window_spans_requested_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let window = TimeWindow::last_days(now, 30);
        assert_eq!(window.end - window.start, Duration::days(30));
        assert_eq!(window.end, now);
    }

    #[test]
    fn window_inclusion_is_inclusive_at_both_ends() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let window = TimeWindow::last_days(now, 1);
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::seconds(1)));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }
}
