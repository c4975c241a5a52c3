use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::diet::Diet;

pub const TIMESTAMP_COL: &str = "Timestamp";
pub const QUERY_COL: &str = "Query";
pub const DIET_COL: &str = "Diet";
pub const HEADERS: [&str; 3] = [TIMESTAMP_COL, QUERY_COL, DIET_COL];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One generation request as persisted in the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(rename = "Timestamp", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Diet")]
    pub diet: Diet,
}

impl QueryRecord {
    pub fn new(timestamp: NaiveDateTime, query: impl Into<String>, diet: Diet) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            query: query.into(),
            diet,
        }
    }

    /// Stamps the record with the current local time, to the second.
    pub fn now(query: impl Into<String>, diet: Diet) -> Self {
        Self::new(Local::now().naive_local(), query, diet)
    }
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(super::TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-01 10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T10:00:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_new_truncates_to_seconds() {
        let with_millis = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(8, 30, 15, 999)
            .unwrap();
        let record = QueryRecord::new(with_millis, "idli", Diet::None);
        assert_eq!(record.timestamp.to_string(), "2024-03-05 08:30:15");
    }
}
