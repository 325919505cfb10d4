//! Time utilities: lenient due-date parsing and local calendar days.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a due date leniently, returning `None` for anything unparseable.
///
/// Accepted, in order:
/// - RFC 3339 (`2026-02-20T23:59:00Z`, any offset)
/// - `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM` interpreted in `tz`
/// - `YYYY-MM-DD`, meaning the last minute of that day in `tz`
pub fn parse_due_date(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_to_utc(ndt, tz);
        }
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    local_to_utc(day.and_time(end_of_day()), tz)
}

/// Today's calendar date in `tz`.
pub fn local_day(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Parse an IANA timezone name such as `America/Chicago`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse().ok()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

// DST gaps have no local instant; an ambiguous fold takes the earlier one.
fn local_to_utc(ndt: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&ndt)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
