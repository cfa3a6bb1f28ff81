use chrono::{NaiveDateTime, Timelike};

/// Timestamp layout in the backing file. Microseconds are always rendered,
/// even when zero.
pub const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepted on load. The fractional part is optional so records written
/// without microseconds still parse.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Render a timestamp for the backing file.
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(WRITE_FORMAT).to_string()
}

/// Parse a timestamp read from the backing file.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, PARSE_FORMAT)
}

/// Current local time, truncated to microseconds so that a value written to
/// the backing file and read back compares equal.
pub fn now() -> NaiveDateTime {
    let t = chrono::Local::now().naive_local();
    t.with_nanosecond(t.nanosecond() / 1000 * 1000).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_microseconds() {
        let stamp = now();
        let parsed = parse_timestamp(&format_timestamp(&stamp)).unwrap();
        assert_eq!(parsed, stamp);
    }

    #[test]
    fn parses_without_fractional_part() {
        let parsed = parse_timestamp("2017-09-28T21:03:54").unwrap();
        assert_eq!(format_timestamp(&parsed), "2017-09-28T21:03:54.000000");
    }

    #[test]
    fn parses_with_fractional_part() {
        let parsed = parse_timestamp("2017-09-28T21:03:54.052298").unwrap();
        assert_eq!(format_timestamp(&parsed), "2017-09-28T21:03:54.052298");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("last tuesday").is_err());
        assert!(parse_timestamp("2017-09-28").is_err());
    }

    #[test]
    fn now_has_no_sub_microsecond_part() {
        assert_eq!(now().nanosecond() % 1000, 0);
    }
}
