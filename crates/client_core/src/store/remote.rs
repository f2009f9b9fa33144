use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::error::ApiError;
use tracing::debug;
use url::Url;

use super::{expect_scheme, KeyScheme, RecordKey, RecordStore, StoreError, StoredRecord};
use crate::entity::{Entity, EntitySchema, RecordFields};

/// Store backed by the `/api/{collection}` REST endpoints.
pub struct RemoteStore<E> {
    http: Client,
    server_url: String,
    editable: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RemoteStore<E> {
    pub fn new(server_url: &str) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, StoreError> {
        Url::parse(server_url).map_err(|source| StoreError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
            editable: true,
            _entity: PhantomData,
        })
    }

    /// The variant without edit controls: `update` is refused locally.
    pub fn delete_only(mut self) -> Self {
        self.editable = false;
        self
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.server_url, E::SCHEMA.collection)
    }

    fn record_url(&self, key: &RecordKey) -> Result<String, StoreError> {
        expect_scheme(KeyScheme::ServerId, key)?;
        Ok(format!("{}/{key}", self.collection_url()))
    }
}

#[async_trait]
impl<E: Entity> RecordStore for RemoteStore<E> {
    fn schema(&self) -> EntitySchema {
        E::SCHEMA
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::ServerId
    }

    fn supports_update(&self) -> bool {
        self.editable
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let url = self.collection_url();
        debug!(%url, "listing records");
        let res = self.http.get(&url).send().await?;
        let records: Vec<E> = ensure_success(res).await?.json().await?;
        records
            .into_iter()
            .map(|record| {
                let id = record.id().ok_or(StoreError::MissingId {
                    collection: E::SCHEMA.collection.as_str(),
                })?;
                Ok(StoredRecord {
                    key: RecordKey::Id(id),
                    fields: record.fields(),
                })
            })
            .collect()
    }

    async fn create(&self, fields: RecordFields) -> Result<(), StoreError> {
        let url = self.collection_url();
        debug!(%url, "creating record");
        let res = self
            .http
            .post(&url)
            .json(&E::from_fields(None, fields))
            .send()
            .await?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn update(&self, key: &RecordKey, fields: RecordFields) -> Result<(), StoreError> {
        if !self.editable {
            return Err(StoreError::Unsupported("update"));
        }
        let url = self.record_url(key)?;
        debug!(%url, "updating record");
        let res = self
            .http
            .put(&url)
            .json(&E::from_fields(None, fields))
            .send()
            .await?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        let url = self.record_url(key)?;
        debug!(%url, "deleting record");
        let res = self.http.delete(&url).send().await?;
        ensure_success(res).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into `StoreError::Status`, preferring the server's
/// `ApiError` message over the raw body.
async fn ensure_success(res: Response) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}
