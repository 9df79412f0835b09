use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::SupabaseClient;
use crate::provider::{Filter, ProviderError, RecordStore};

const RETURN_REPRESENTATION: &str = "return=representation";

impl SupabaseClient {
    fn table_url(&self, table: &str, filter: &Filter) -> Url {
        let mut url = self.rest_url(table);
        // query_pairs_mut would leave a bare `?` behind for an empty filter
        if !filter.conditions().is_empty() {
            let mut query = url.query_pairs_mut();
            for (column, value) in filter.conditions() {
                query.append_pair(column, &format!("eq.{}", value));
            }
        }
        url
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn insert(&self, table: &str, row: Value) -> Result<Value, ProviderError> {
        let url = self.rest_url(table);
        let rows: Vec<Value> = self
            .send_json(self.http.post(url).header("Prefer", RETURN_REPRESENTATION).json(&row))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ProviderError> {
        let mut url = self.table_url(table, filter);
        url.query_pairs_mut().append_pair("select", "*");

        self.send_json(self.http.get(url)).await
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, ProviderError> {
        let url = self.table_url(table, filter);
        self.send_json(self.http.patch(url).header("Prefer", RETURN_REPRESENTATION).json(&patch))
            .await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), ProviderError> {
        let url = self.table_url(table, filter);
        self.send_empty(self.http.delete(url)).await
    }
}
