use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, RecordId};
use crate::api::{FieldErrors, Validate};

/// Contract row. `customerId` is stored as given; its existence is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: RecordId,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub details: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContract {
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub details: String,
}

impl Validate for CreateContract {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("customerId", &self.customer_id)
            .not_blank("details", &self.details);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContract {
    #[serde(rename = "customerId", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Validate for UpdateContract {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(customer_id) = &self.customer_id {
            errors.not_blank("customerId", customer_id);
        }
        if let Some(details) = &self.details {
            errors.not_blank("details", details);
        }
        errors.into_result()
    }
}
