//! Build timestamp formatting.

use chrono::{DateTime, FixedOffset, Local, Utc};
use fwstamp_config::TimestampZone;

/// Layout of the timestamp proper, before any zone annotation.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The current time rendered for the version header.
pub fn build_timestamp(zone: TimestampZone) -> String {
    format_timestamp(&Local::now().fixed_offset(), zone)
}

/// Render `now` as `YYYY-MM-DD HH:MM:SS`, annotated according to `zone`.
///
/// [`TimestampZone::Offset`] appends the numeric offset (`+02:00`), not a
/// zone name.
pub fn format_timestamp(now: &DateTime<FixedOffset>, zone: TimestampZone) -> String {
    match zone {
        TimestampZone::Offset => {
            format!("{} ({})", now.format(TIMESTAMP_FORMAT), now.format("%:z"))
        }
        TimestampZone::Utc => {
            format!("{} (UTC)", now.with_timezone(&Utc).format(TIMESTAMP_FORMAT))
        }
        TimestampZone::None => now.format(TIMESTAMP_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn rome_summer() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 15, 23, 40, 44)
            .unwrap()
    }

    #[test]
    fn test_offset_annotation() {
        assert_eq!(
            format_timestamp(&rome_summer(), TimestampZone::Offset),
            "2025-06-15 23:40:44 (+02:00)"
        );
    }

    #[test]
    fn test_utc_annotation_converts() {
        assert_eq!(
            format_timestamp(&rome_summer(), TimestampZone::Utc),
            "2025-06-15 21:40:44 (UTC)"
        );
    }

    #[test]
    fn test_bare_timestamp() {
        assert_eq!(
            format_timestamp(&rome_summer(), TimestampZone::None),
            "2025-06-15 23:40:44"
        );
    }

    #[test]
    fn test_build_timestamp_has_expected_shape() {
        let ts = build_timestamp(TimestampZone::None);
        assert_eq!(ts.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
