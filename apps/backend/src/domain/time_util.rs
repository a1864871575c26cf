//! Epoch-millisecond conversions for stored timestamps.

use time::OffsetDateTime;

pub fn to_millis(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Out-of-range values clamp to the Unix epoch.
pub fn from_millis(ms: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Current time truncated to millisecond precision, so values round-trip
/// through storage unchanged.
pub fn now_millis() -> OffsetDateTime {
    from_millis(to_millis(OffsetDateTime::now_utc()))
}
