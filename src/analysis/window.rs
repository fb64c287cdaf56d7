// Time window over log timestamps
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts tried after RFC 3339, all read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    // Kibana CSV export: "Jun 3, 2025 @ 10:15:00.000"
    "%b %d, %Y @ %H:%M:%S%.f",
];

/// Parse a gateway timestamp
///
/// Accepts RFC 3339, naive ISO date-times (assumed UTC), Kibana export
/// timestamps, bare dates, and epoch milliseconds. Returns `None` for
/// anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if raw.len() >= 12 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok().and_then(DateTime::from_timestamp_millis);
    }

    None
}

/// Earliest and latest parseable timestamp of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Span as "H hours, M minutes, S seconds"
    ///
    /// Zero hours and minutes are left out; seconds are shown when they are
    /// non-zero or when nothing else is.
    pub fn duration_label(&self) -> String {
        let total = self.duration().num_seconds().max(0);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        let unit = |n: i64, name: &str| format!("{} {}{}", n, name, if n == 1 { "" } else { "s" });

        let mut parts = Vec::new();
        if hours > 0 {
            parts.push(unit(hours, "hour"));
        }
        if minutes > 0 {
            parts.push(unit(minutes, "minute"));
        }
        if seconds > 0 || parts.is_empty() {
            parts.push(unit(seconds, "second"));
        }
        parts.join(", ")
    }
}

/// Running min/max over timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAccumulator {
    bounds: Option<TimeWindow>,
    unparsed: usize,
}

impl WindowAccumulator {
    pub fn observe(&mut self, raw: Option<&str>) {
        match raw.and_then(parse_timestamp) {
            Some(ts) => self.include(ts),
            None => self.unparsed += 1,
        }
    }

    fn include(&mut self, ts: DateTime<Utc>) {
        self.bounds = Some(match self.bounds {
            None => TimeWindow { start: ts, end: ts },
            Some(w) => TimeWindow {
                start: w.start.min(ts),
                end: w.end.max(ts),
            },
        });
    }

    pub fn merge(mut self, other: Self) -> Self {
        if let Some(w) = other.bounds {
            self.include(w.start);
            self.include(w.end);
        }
        self.unparsed += other.unparsed;
        self
    }

    /// Rows whose timestamp was absent or unreadable
    pub fn unparsed(&self) -> usize {
        self.unparsed
    }

    pub fn finish(self) -> Option<TimeWindow> {
        self.bounds
    }
}
