use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, RecordId};
use crate::api::{FieldErrors, Validate};

pub const DEFAULT_CHANNEL: &str = "kakao";

/// Per-account notification preferences, one row per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: RecordId,
    pub user_id: String,
    pub notify_signup: bool,
    pub notify_maturity: bool,
    pub notify_birthday: bool,
    pub preferred_channel: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserSettings {
    pub user_id: String,
    pub notify_signup: bool,
    pub notify_maturity: bool,
    pub notify_birthday: bool,
    pub preferred_channel: String,
}

impl NewUserSettings {
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            notify_signup: true,
            notify_maturity: true,
            notify_birthday: true,
            preferred_channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_signup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_maturity: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_birthday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_channel: Option<String>,
}

impl UpdateUserSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Validate for UpdateUserSettings {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(channel) = &self.preferred_channel {
            errors.not_blank("preferred_channel", channel);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_enable_everything_over_kakao() {
        let settings = NewUserSettings::defaults_for("u-1");
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "user_id": "u-1",
                "notify_signup": true,
                "notify_maturity": true,
                "notify_birthday": true,
                "preferred_channel": "kakao"
            })
        );
    }

    #[test]
    fn partial_update() {
        let update: UpdateUserSettings = serde_json::from_value(json!({ "notify_birthday": false })).unwrap();
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "notify_birthday": false }));
        assert!(UpdateUserSettings::default().is_empty());
    }
}
