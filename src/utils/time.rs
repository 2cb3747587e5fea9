//! Timestamp helpers.

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Formats a zone-less database timestamp as RFC 3339, taking it to be UTC.
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> String {
    let timestamp = timestamp.assume_utc();
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Seconds since the Unix epoch, with sub-second precision.
pub fn unix_seconds(at: OffsetDateTime) -> f64 {
    (at - OffsetDateTime::UNIX_EPOCH).as_seconds_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamps_format_as_utc_rfc3339() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-01 12:30:05)),
            "2024-03-01T12:30:05Z"
        );
    }

    #[test]
    fn unix_seconds_keeps_fractions() {
        assert_eq!(unix_seconds(datetime!(1970-01-01 00:00:01.5 UTC)), 1.5);
        assert_eq!(unix_seconds(OffsetDateTime::UNIX_EPOCH), 0.0);
    }
}
