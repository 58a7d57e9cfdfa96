//! Wall-clock timestamps in the `YYYY-MM-DD HH:MM:SS` form used by both the
//! credential file and history records.

use chrono::{Local, NaiveDateTime, Timelike};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp used in history file names (`code_20250101_093000.txt`)
pub const FILE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Current local time, truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(FORMAT).to_string()
}

pub fn parse(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), FORMAT).ok()
}

/// Serde adapter for a required timestamp
pub mod required {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(d)?;
        super::parse(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text)))
    }
}

/// Serde adapter for a nullable timestamp
pub mod optional {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_str(&super::format(ts)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(text) => super::parse(&text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse() {
        let ts = parse("2025-03-01 09:30:05").unwrap();
        assert_eq!(format(&ts), "2025-03-01 09:30:05");
        assert_eq!(ts.format(FILE_FORMAT).to_string(), "20250301_093005");
        assert!(parse("yesterday").is_none());
    }

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().nanosecond(), 0);
    }
}
