use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    domain::RecordId,
    error::{ApiError, ErrorCode},
    protocol::{CreatedResponse, InventoryItem},
};
use tokio::{net::TcpListener, sync::Mutex};

use super::{remote::RemoteStore, KeyScheme, RecordKey, RecordStore, StoreError};
use crate::entity::RecordFields;

#[derive(Clone, Default)]
struct StubState {
    items: Arc<Mutex<Vec<InventoryItem>>>,
    next_id: Arc<Mutex<i64>>,
}

async fn stub_list(State(state): State<StubState>) -> Json<Vec<InventoryItem>> {
    Json(state.items.lock().await.clone())
}

async fn stub_create(
    State(state): State<StubState>,
    Json(mut item): Json<InventoryItem>,
) -> (StatusCode, Json<CreatedResponse>) {
    let mut next_id = state.next_id.lock().await;
    *next_id += 1;
    let id = RecordId(*next_id);
    item.id = Some(id);
    state.items.lock().await.push(item);
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

async fn stub_update(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    Json(update): Json<InventoryItem>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let mut items = state.items.lock().await;
    let item = items
        .iter_mut()
        .find(|item| item.id == Some(RecordId(id)))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(ErrorCode::NotFound, "not found")),
            )
        })?;
    item.name = update.name;
    item.quantity = update.quantity;
    Ok(Json(serde_json::json!({})))
}

async fn stub_delete(State(state): State<StubState>, Path(id): Path<i64>) -> Json<serde_json::Value> {
    state
        .items
        .lock()
        .await
        .retain(|item| item.id != Some(RecordId(id)));
    Json(serde_json::json!({}))
}

async fn spawn_stub() -> std::io::Result<(String, StubState)> {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/inventory", get(stub_list).post(stub_create))
        .route("/api/inventory/:id", put(stub_update).delete(stub_delete))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn lists_creates_updates_and_deletes_over_http() {
    let (server_url, state) = spawn_stub().await.expect("stub");
    let store = RemoteStore::<InventoryItem>::new(&server_url).expect("store");
    assert_eq!(store.key_scheme(), KeyScheme::ServerId);
    assert!(store.supports_update());

    assert!(store.list().await.expect("list").is_empty());

    store
        .create(RecordFields::new("철근", "100"))
        .await
        .expect("create");
    let listed = store.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, RecordKey::Id(RecordId(1)));
    assert_eq!(listed[0].fields, RecordFields::new("철근", "100"));

    store
        .update(&listed[0].key, RecordFields::new("특수철근", "100"))
        .await
        .expect("update");
    assert_eq!(state.items.lock().await[0].name, "특수철근");

    store.delete(&listed[0].key).await.expect("delete");
    assert!(store.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn surfaces_server_error_message() {
    let (server_url, _state) = spawn_stub().await.expect("stub");
    let store = RemoteStore::<InventoryItem>::new(&format!("{server_url}/")).expect("store");

    let err = store
        .update(&RecordKey::Id(RecordId(404)), RecordFields::new("x", "y"))
        .await
        .expect_err("missing record");
    match err {
        StoreError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn delete_only_variant_refuses_update_without_a_request() {
    let (server_url, state) = spawn_stub().await.expect("stub");
    let store = RemoteStore::<InventoryItem>::new(&server_url)
        .expect("store")
        .delete_only();
    store
        .create(RecordFields::new("철근", "100"))
        .await
        .expect("create");

    assert!(!store.supports_update());
    assert!(matches!(
        store
            .update(&RecordKey::Id(RecordId(1)), RecordFields::new("x", "y"))
            .await,
        Err(StoreError::Unsupported("update"))
    ));
    assert_eq!(state.items.lock().await[0].name, "철근");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = RemoteStore::<InventoryItem>::new(&format!("http://{addr}")).expect("store");
    assert!(matches!(
        store.list().await,
        Err(StoreError::Transport(_))
    ));
}

#[test]
fn rejects_malformed_server_url() {
    assert!(matches!(
        RemoteStore::<InventoryItem>::new("not a url"),
        Err(StoreError::InvalidUrl { .. })
    ));
}
