use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_rfc3339(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Local wall-clock rendering stored alongside each history entry,
/// e.g. `1/5/2026, 3:04:05 PM`.
pub fn to_display_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

pub fn to_local_display_timestamp(dt: DateTime<Utc>) -> String {
    to_display_timestamp(&dt.with_timezone(&Local))
}

/// History list rendering of an ISO date, e.g. `Jan 5, 2026, 03:04 PM`.
/// Falls back to the raw string when it is not a valid date.
pub fn format_history_date(iso: &str) -> String {
    match from_rfc3339(iso) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%b %-d, %Y, %I:%M %p")
            .to_string(),
        Err(_) => iso.to_string(),
    }
}

/// `minutes:seconds` with the seconds zero-padded, e.g. 125 -> `2:05`.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_completion(seconds: Option<u64>) -> String {
    match seconds {
        Some(secs) => format_clock(secs),
        None => "N/A".to_string(),
    }
}

/// Whole seconds between two epoch-millisecond instants, never negative.
pub fn whole_seconds_between(start_millis: i64, end_millis: i64) -> u64 {
    (end_millis - start_millis).max(0) as u64 / 1000
}
