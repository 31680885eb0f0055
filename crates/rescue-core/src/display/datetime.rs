//! DateTime display utilities.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};

/// Displays an ISO-8601 timestamp string in the system timezone.
///
/// Format: `YYYY-MM-DD HH:MM:SS TZ`. Strings that do not parse as a
/// timestamp are written unchanged.
pub struct LocalDateTime<'a>(pub &'a str);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.parse::<Timestamp>() {
            Ok(ts) => write!(
                f,
                "{}",
                ts.to_zoned(TimeZone::system())
                    .strftime("%Y-%m-%d %H:%M:%S %Z")
            ),
            Err(_) => f.write_str(self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(LocalDateTime("yesterday").to_string(), "yesterday");
        assert_eq!(LocalDateTime("").to_string(), "");
    }

    #[test]
    fn test_parseable_is_reformatted() {
        let shown = LocalDateTime("2025-09-11T10:00:00Z").to_string();
        assert_ne!(shown, "2025-09-11T10:00:00Z");
        assert!(shown.starts_with("2025-09-1"));
    }
}
