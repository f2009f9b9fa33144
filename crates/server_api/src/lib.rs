use serde::Serialize;
use serde_json::{Map, Value};
use shared::{
    domain::{Collection, RecordId},
    error::{ApiError, ErrorCode},
    protocol::{CreatedResponse, InventoryItem, Supplier},
};
use storage::{Storage, StoredRecord};
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Request body of a create or update call, keyed by JSON field name.
pub type RecordBody = Map<String, Value>;

/// A full collection listing, serialized as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordList {
    Inventory(Vec<InventoryItem>),
    Suppliers(Vec<Supplier>),
}

impl RecordList {
    fn from_stored(collection: Collection, records: Vec<StoredRecord>) -> Self {
        match collection {
            Collection::Inventory => RecordList::Inventory(
                records
                    .into_iter()
                    .map(|r| InventoryItem {
                        id: Some(r.id),
                        name: r.name,
                        quantity: r.detail,
                    })
                    .collect(),
            ),
            Collection::Suppliers => RecordList::Suppliers(
                records
                    .into_iter()
                    .map(|r| Supplier {
                        id: Some(r.id),
                        name: r.name,
                        note: r.detail,
                    })
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordList::Inventory(items) => items.len(),
            RecordList::Suppliers(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn parse_collection(raw: &str) -> Result<Collection, ApiError> {
    raw.parse::<Collection>()
        .map_err(|e| ApiError::new(ErrorCode::NotFound, e.to_string()))
}

pub fn parse_record_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<i64>()
        .map(RecordId)
        .map_err(|_| ApiError::new(ErrorCode::Validation, "invalid id"))
}

/// An empty body reads as `{}`; anything that is not a JSON object is rejected.
pub fn parse_body(raw: &[u8]) -> Result<RecordBody, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordBody::new());
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(invalid_data()),
    }
}

pub async fn list_records(ctx: &ApiContext, collection: Collection) -> Result<RecordList, ApiError> {
    let records = ctx
        .storage
        .list_records(collection)
        .await
        .map_err(internal)?;
    Ok(RecordList::from_stored(collection, records))
}

pub async fn create_record(
    ctx: &ApiContext,
    collection: Collection,
    body: &RecordBody,
) -> Result<CreatedResponse, ApiError> {
    let name = text_field(body, "name")?;
    let detail = text_field(body, collection.detail_field())?;
    let (Some(name), Some(detail)) = (name, detail) else {
        return Err(invalid_data());
    };

    let id = ctx
        .storage
        .insert_record(collection, &name, &detail)
        .await
        .map_err(internal)?;
    debug!(%collection, %id, "record created");
    Ok(CreatedResponse { id })
}

pub async fn update_record(
    ctx: &ApiContext,
    collection: Collection,
    id: RecordId,
    body: &RecordBody,
) -> Result<(), ApiError> {
    let name = text_field(body, "name")?;
    let detail = text_field(body, collection.detail_field())?;
    if name.is_none() && detail.is_none() {
        return Err(invalid_data());
    }

    let found = ctx
        .storage
        .update_record(collection, id, name.as_deref(), detail.as_deref())
        .await
        .map_err(internal)?;
    if !found {
        return Err(ApiError::new(ErrorCode::NotFound, "not found"));
    }
    debug!(%collection, %id, "record updated");
    Ok(())
}

/// Deleting an id that does not exist is not an error.
pub async fn delete_record(
    ctx: &ApiContext,
    collection: Collection,
    id: RecordId,
) -> Result<(), ApiError> {
    let removed = ctx
        .storage
        .delete_record(collection, id)
        .await
        .map_err(internal)?;
    debug!(%collection, %id, removed, "record delete handled");
    Ok(())
}

/// Strings are taken as-is and numbers are stored in their JSON text form.
fn text_field(body: &RecordBody, key: &str) -> Result<Option<String>, ApiError> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(invalid_data()),
    }
}

fn invalid_data() -> ApiError {
    ApiError::new(ErrorCode::Validation, "invalid data")
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
