use std::sync::Arc;

use super::error::{ServiceError, ServiceResult};
use crate::models::{UpdateUserSettings, UserSettings};
use crate::provider::{Filter, ProviderError, RecordStore};

pub const USER_SETTINGS_TABLE: &str = "user_settings";

const NOT_FOUND: &str = "User settings not found";

pub struct UserSettingsService {
    store: Arc<dyn RecordStore>,
}

impl UserSettingsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, user_id: &str) -> ServiceResult<UserSettings> {
        let row = self
            .store
            .select_one(USER_SETTINGS_TABLE, &owned_by(user_id))
            .await
            .map_err(|e| lookup_failed(user_id, e))?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))?;
        decode(row)
    }

    /// Apply only the supplied fields; an empty patch reads the current row.
    pub async fn update(&self, user_id: &str, patch: &UpdateUserSettings) -> ServiceResult<UserSettings> {
        if patch.is_empty() {
            return self.get(user_id).await;
        }

        let patch = serde_json::to_value(patch).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let row = self
            .store
            .update(USER_SETTINGS_TABLE, &owned_by(user_id), patch)
            .await
            .map_err(|e| lookup_failed(user_id, e))?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))?;

        tracing::info!(user_id, "user settings updated");
        decode(row)
    }
}

fn owned_by(user_id: &str) -> Filter {
    Filter::all().eq("user_id", user_id)
}

/// Rejections read as "no settings"; an unreachable store stays a provider failure.
fn lookup_failed(user_id: &str, err: ProviderError) -> ServiceError {
    if err.is_unavailable() {
        return ServiceError::Provider(err);
    }
    tracing::warn!(user_id, error = %err, "user settings lookup rejected");
    ServiceError::NotFound(NOT_FOUND.to_string())
}

fn decode(row: serde_json::Value) -> ServiceResult<UserSettings> {
    serde_json::from_value(row).map_err(|e| ServiceError::Provider(ProviderError::Decode(e.to_string())))
}
