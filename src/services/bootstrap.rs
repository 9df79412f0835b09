//! Seeding of default notification settings for new accounts.
//!
//! Seeding runs detached from the registration request. Its failures never
//! reach the caller; they are sent down a channel that a logging task drains.

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::user_settings::USER_SETTINGS_TABLE;
use crate::models::{NewUserSettings, UserSettings};
use crate::provider::{ProviderError, RecordStore};

#[derive(Debug)]
pub struct BootstrapFailure {
    pub user_id: String,
    pub error: ProviderError,
}

#[derive(Clone)]
pub struct SettingsBootstrapper {
    store: Arc<dyn RecordStore>,
    failures: UnboundedSender<BootstrapFailure>,
}

impl SettingsBootstrapper {
    pub fn new(store: Arc<dyn RecordStore>) -> (Self, UnboundedReceiver<BootstrapFailure>) {
        let (failures, rx) = unbounded_channel();
        (Self { store, failures }, rx)
    }

    /// Insert the default settings row for `user_id`. Not idempotent: a
    /// second call inserts a second row or trips the store's uniqueness rule.
    pub async fn create_default_settings(&self, user_id: &str) -> Result<UserSettings, ProviderError> {
        let row = serde_json::to_value(NewUserSettings::defaults_for(user_id))
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        let stored = self.store.insert(USER_SETTINGS_TABLE, row).await?;
        let settings =
            serde_json::from_value(stored).map_err(|e| ProviderError::Decode(e.to_string()))?;
        tracing::info!(user_id, "default user settings created");
        Ok(settings)
    }

    /// Seed settings in the background.
    pub fn dispatch(&self, user_id: &str) -> JoinHandle<()> {
        let bootstrapper = self.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            if let Err(error) = bootstrapper.create_default_settings(&user_id).await {
                // Receiver gone means nobody is listening; the failure is still logged here.
                if bootstrapper.failures.send(BootstrapFailure { user_id, error }).is_err() {
                    tracing::warn!("bootstrap failure channel closed");
                }
            }
        })
    }
}

/// Drain bootstrap failures into the log until every sender is dropped.
pub async fn report_bootstrap_failures(mut rx: UnboundedReceiver<BootstrapFailure>) {
    while let Some(failure) = rx.recv().await {
        tracing::warn!(
            user_id = %failure.user_id,
            error = %failure.error,
            "failed to create default user settings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Filter;
    use crate::testing::{MemoryRecordStore, Operation};

    #[tokio::test]
    async fn seeds_defaults() {
        let store = Arc::new(MemoryRecordStore::new());
        let (bootstrapper, _rx) = SettingsBootstrapper::new(store.clone());

        bootstrapper.dispatch("u-1").await.unwrap();

        let rows = store
            .select(USER_SETTINGS_TABLE, &Filter::all().eq("user_id", "u-1"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["preferred_channel"], "kakao");
        assert_eq!(rows[0]["notify_birthday"], true);
    }

    #[tokio::test]
    async fn failures_go_to_the_channel() {
        let store = Arc::new(MemoryRecordStore::new());
        store.fail_on(USER_SETTINGS_TABLE, Operation::Insert);
        let (bootstrapper, mut rx) = SettingsBootstrapper::new(store);

        bootstrapper.dispatch("u-2").await.unwrap();

        let failure = rx.recv().await.unwrap();
        assert_eq!(failure.user_id, "u-2");
    }
}
