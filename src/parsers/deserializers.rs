use chrono::{DateTime, Utc};
use serde_json::Value;

/// Interpret a transcript timestamp: Unix milliseconds or an RFC 3339 string
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}
