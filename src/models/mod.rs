pub mod auth;
pub mod contract;
pub mod customer;
pub mod user_settings;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use auth::{
    AuthResponse, Confirmation, Identity, RegistrationOutcome, Session, TokenInfo, TokenType,
};
pub use contract::{Contract, CreateContract, UpdateContract};
pub use customer::{CreateCustomer, Customer, UpdateCustomer};
pub use user_settings::{NewUserSettings, UpdateUserSettings, UserSettings};

/// Provider-generated row id; tables may use uuid or bigint keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(RecordId(s)),
            Value::Number(n) => Ok(RecordId(n.to_string())),
            other => Err(serde::de::Error::custom(format!("invalid record id: {}", other))),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Calendar dates arrive either as `YYYY-MM-DD` or as RFC 3339 timestamps
/// (date columns stored as timestamptz); both are read as the date part.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", raw))),
                None => Ok(None),
            }
        }
    }
}

/// Row timestamps: `timestamptz` columns arrive as RFC 3339, plain
/// `timestamp` columns without an offset and are read as UTC. Null or absent
/// reads as `None`.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn record_ids_accept_numbers_and_strings() {
        let id: RecordId = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(id.to_string(), "42");
        let id: RecordId = serde_json::from_value(serde_json::json!("0b7c")).unwrap();
        assert_eq!(id.0, "0b7c");
        assert!(serde_json::from_value::<RecordId>(serde_json::json!(null)).is_err());
    }

    #[test]
    fn calendar_dates_accept_timestamps() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        assert_eq!(calendar_date::parse("1990-05-17"), Some(expected));
        assert_eq!(calendar_date::parse("1990-05-17T00:00:00.000Z"), Some(expected));
        assert_eq!(calendar_date::parse("17/05/1990"), None);
    }

    #[test]
    fn timestamps_accept_naive_columns() {
        let expected = timestamp::parse("2024-01-02T03:04:05Z");
        assert!(expected.is_some());
        assert_eq!(timestamp::parse("2024-01-02T03:04:05"), expected);
        assert_eq!(timestamp::parse("2024-01-02 03:04:05"), expected);
        assert_eq!(timestamp::parse("2024-01-02T03:04:05.000+00:00"), expected);
        assert_eq!(timestamp::parse("yesterday"), None);
    }
}
