use chrono::{SecondsFormat, Utc};

/// Milliseconds since the Unix epoch, clamped at zero.
pub fn epoch_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Current time as an RFC 3339 timestamp with millisecond precision, e.g.
/// `2026-02-14T09:30:00.123Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
