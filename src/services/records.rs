use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::error::{ServiceError, ServiceResult};
use crate::provider::{Filter, ProviderError, ProviderErrorKind, RecordStore};

/// Plain table passthrough for one entity type. Create and update payloads
/// are forwarded as given; stored rows are decoded into `T`.
pub struct RecordService<T> {
    store: Arc<dyn RecordStore>,
    table: &'static str,
    entity: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RecordService<T> {
    pub fn new(store: Arc<dyn RecordStore>, table: &'static str, entity: &'static str) -> Self {
        Self {
            store,
            table,
            entity,
            _entity: PhantomData,
        }
    }

    pub async fn create<P: Serialize>(&self, payload: &P) -> ServiceResult<T> {
        let row = self.store.insert(self.table, to_row(payload)?).await?;
        tracing::info!(table = self.table, "record created");
        decode(row)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<T>> {
        self.store
            .select(self.table, &Filter::all())
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<T> {
        let row = self
            .store
            .select_one(self.table, &Filter::by_id(id))
            .await
            .map_err(|e| self.lookup_failed(id, e))?
            .ok_or_else(|| self.not_found())?;
        decode(row)
    }

    pub async fn update<P: Serialize>(&self, id: &str, payload: &P) -> ServiceResult<T> {
        let row = self
            .store
            .update(self.table, &Filter::by_id(id), to_row(payload)?)
            .await
            .map_err(|e| self.missing_on_lookup(e))?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found())?;
        tracing::info!(table = self.table, id, "record updated");
        decode(row)
    }

    pub async fn remove(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(self.table, &Filter::by_id(id)).await?;
        tracing::info!(table = self.table, id, "record deleted");
        Ok(())
    }

    fn not_found(&self) -> ServiceError {
        ServiceError::NotFound(format!("{} not found", self.entity))
    }

    /// Any rejected lookup (e.g. an id the column type cannot parse) reads as
    /// a missing record; an unreachable store stays a provider failure.
    fn lookup_failed(&self, id: &str, err: ProviderError) -> ServiceError {
        if err.is_unavailable() {
            return ServiceError::Provider(err);
        }
        tracing::warn!(table = self.table, id, error = %err, "record lookup rejected");
        self.not_found()
    }

    fn missing_on_lookup(&self, err: ProviderError) -> ServiceError {
        if err.kind() == ProviderErrorKind::NotFound {
            self.not_found()
        } else {
            ServiceError::Provider(err)
        }
    }
}

fn to_row<P: Serialize>(payload: &P) -> ServiceResult<Value> {
    serde_json::to_value(payload).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
}

fn decode<T: DeserializeOwned>(row: Value) -> ServiceResult<T> {
    serde_json::from_value(row).map_err(|e| ServiceError::Provider(ProviderError::Decode(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contract, CreateContract, UpdateContract};
    use crate::testing::{MemoryRecordStore, Operation};

    fn contracts() -> RecordService<Contract> {
        RecordService::new(Arc::new(MemoryRecordStore::new()), "contracts", "Contract")
    }

    #[tokio::test]
    async fn crud_passthrough() {
        let service = contracts();
        let created = service
            .create(&CreateContract {
                customer_id: "c-1".into(),
                details: "12 month plan".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.customer_id, "c-1");

        let id = created.id.to_string();
        let updated = service
            .update(
                &id,
                &UpdateContract {
                    details: Some("24 month plan".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.details, "24 month plan");
        assert_eq!(updated.customer_id, "c-1");
        assert!(updated.updated_at.is_some());

        assert_eq!(service.find_all().await.unwrap().len(), 1);
        service.remove(&id).await.unwrap();
        assert!(service.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = contracts();
        match service.find_one("missing").await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Contract not found"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
        let patch = UpdateContract::default();
        assert!(matches!(service.update("missing", &patch).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn rejected_lookups_are_not_found() {
        let store = Arc::new(MemoryRecordStore::new());
        let service: RecordService<Contract> = RecordService::new(store.clone(), "contracts", "Contract");

        // e.g. PostgREST 22P02 for an id that is not a valid uuid
        store.fail_on("contracts", Operation::Select);
        match service.find_one("not-a-uuid").await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Contract not found"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}
