use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Weekday};

pub const WEEKDAY_CODES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Local wall-clock time, the `now` every engine function is evaluated at.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts both `2026-03-05` and the unpadded `2026-3-5`.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

pub fn yesterday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

pub fn weekday_code(date: NaiveDate) -> &'static str {
    WEEKDAY_CODES[date.weekday().num_days_from_monday() as usize]
}

pub fn narrow_weekday(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "M",
        Weekday::Tue | Weekday::Thu => "T",
        Weekday::Wed => "W",
        Weekday::Fri => "F",
        Weekday::Sat | Weekday::Sun => "S",
    }
}

pub fn is_weekday_code(code: &str) -> bool {
    WEEKDAY_CODES.contains(&code)
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn epoch_millis(at: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&at).earliest() {
        Some(local) => local.timestamp_millis(),
        None => at.and_utc().timestamp_millis(),
    }
}

/// Serde adapter for optional completion timestamps.
///
/// Stored values are local wall-clock times. Reading is lenient: an empty
/// string, `null`, or anything unparseable is treated as "never", RFC 3339
/// values are shifted into local time, bare dates mean midnight and numbers
/// are epoch milliseconds.
pub mod timestamp {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(text)) => parse(&text),
            Some(Value::Number(number)) => number
                .as_i64()
                .and_then(|millis| Local.timestamp_millis_opt(millis).single())
                .map(|local| local.naive_local()),
            _ => None,
        })
    }

    pub fn parse(text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Some(at.with_timezone(&Local).naive_local());
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(text, FORMAT) {
            return Some(at);
        }
        parse_day_key(text).and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}
