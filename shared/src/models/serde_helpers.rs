//! Common serde helpers
//!
//! 预约时间统一以 "HH:MM" 传输，兼容 "HH:MM:SS" 输入（秒被截断）。

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

const TIME_FORMAT: &str = "%H:%M";

/// Parse "HH:MM" or "HH:MM:SS", truncated to the minute
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
}

/// NaiveTime as "HH:MM"
pub mod hhmm {
    use super::*;

    pub fn serialize<S>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm_accepts_seconds() {
        let t = parse_hhmm("18:00:45").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(parse_hhmm(" 09:30 "), NaiveTime::from_hms_opt(9, 30, 0));
        assert!(parse_hhmm("25:00").is_none());
        assert!(parse_hhmm("evening").is_none());
    }
}
