use crate::config::Config;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

/// Produces the timestamps stamped onto documents.
#[derive(Debug, Clone, Default)]
pub struct Timestamp {
    format: Option<String>,
}

impl Timestamp {
    pub fn new(config: &Config) -> Self {
        Timestamp {
            format: config.timestamp_format.clone(),
        }
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Current time, formatted with `TIMESTAMP_FORMAT` or RFC 3339.
    pub fn now(&self) -> String {
        self.format(&self.now_utc())
    }

    pub fn format(&self, at: &DateTime<Utc>) -> String {
        if let Some(fmt) = &self.format {
            let mut out = String::new();
            if write!(out, "{}", at.format(fmt)).is_ok() {
                return out;
            }
            log::warn!("Invalid TIMESTAMP_FORMAT '{fmt}', falling back to RFC 3339");
        }
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_rfc3339() {
        let ts = Timestamp::new(&Config::new());
        let at = Utc.with_ymd_and_hms(2026, 2, 13, 9, 30, 0).unwrap();
        assert_eq!(ts.format(&at), "2026-02-13T09:30:00.000Z");
    }

    #[test]
    fn test_custom_format() {
        let ts = Timestamp::new(&Config::new().timestamp_format("%Y/%m/%d"));
        let at = Utc.with_ymd_and_hms(2026, 2, 13, 9, 30, 0).unwrap();
        assert_eq!(ts.format(&at), "2026/02/13");
    }

    #[test]
    fn test_now_parses_back() {
        let ts = Timestamp::new(&Config::new());
        let parsed = DateTime::parse_from_rfc3339(&ts.now()).unwrap();
        assert!(parsed.with_timezone(&Utc) <= Utc::now());
    }
}
