use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{calendar_date, timestamp, RecordId};
use crate::api::{FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    #[serde(default, with = "calendar_date::option")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date::option")]
    pub signup_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date::option")]
    pub maturity_date: Option<NaiveDate>,
    #[serde(default)]
    pub auto_payment: bool,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    #[serde(with = "calendar_date")]
    pub birth_date: NaiveDate,
    #[serde(with = "calendar_date")]
    pub signup_date: NaiveDate,
    #[serde(with = "calendar_date")]
    pub maturity_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_payment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.not_blank("name", &self.name).not_blank("phone", &self.phone);
        errors.into_result()
    }
}

/// Partial update; absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, with = "calendar_date::option", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date::option", skip_serializing_if = "Option::is_none")]
    pub signup_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date::option", skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_payment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.not_blank("name", name);
        }
        if let Some(phone) = &self.phone {
            errors.not_blank("phone", phone);
        }
        errors.into_result()
    }
}
