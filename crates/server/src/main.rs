use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, get_service},
    Json, Router,
};
use serde_json::Value;
use server_api::{
    create_record, delete_record, list_records, parse_body, parse_collection, parse_record_id,
    update_record, ApiContext, RecordList,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::CreatedResponse,
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, normalize_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiFailure = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
        static_dir: settings.static_dir,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Item paths answer GET from the static directory; any other unhandled method
/// under `/api` is a 404.
fn build_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/:collection",
            get(http_list_records)
                .post(http_create_record)
                .fallback(api_not_found),
        )
        .route(
            "/api/:collection/",
            get_service(static_files.clone())
                .put(http_missing_record_id)
                .delete(http_missing_record_id)
                .fallback(api_not_found),
        )
        .route(
            "/api/:collection/:id",
            get_service(static_files.clone())
                .put(http_update_record)
                .delete(http_delete_record)
                .fallback(api_not_found),
        )
        .fallback_service(static_files)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiFailure> {
    state.api.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_records(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Json<RecordList>, ApiFailure> {
    let collection = parse_collection(&collection).map_err(failure)?;
    let records = list_records(&state.api, collection)
        .await
        .map_err(failure)?;
    Ok(Json(records))
}

async fn http_create_record(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiFailure> {
    let collection = parse_collection(&collection).map_err(failure)?;
    let body = parse_body(&body).map_err(failure)?;
    let created = create_record(&state.api, collection, &body)
        .await
        .map_err(failure)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_update_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiFailure> {
    let collection = parse_collection(&collection).map_err(failure)?;
    let id = parse_record_id(&id).map_err(failure)?;
    let body = parse_body(&body).map_err(failure)?;
    update_record(&state.api, collection, id, &body)
        .await
        .map_err(failure)?;
    Ok(Json(serde_json::json!({})))
}

async fn http_delete_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let collection = parse_collection(&collection).map_err(failure)?;
    let id = parse_record_id(&id).map_err(failure)?;
    delete_record(&state.api, collection, id)
        .await
        .map_err(failure)?;
    Ok(Json(serde_json::json!({})))
}

async fn http_missing_record_id(Path(collection): Path<String>) -> ApiFailure {
    if let Err(err) = parse_collection(&collection) {
        return failure(err);
    }
    failure(ApiError::new(ErrorCode::Validation, "invalid id"))
}

async fn api_not_found() -> ApiFailure {
    failure(ApiError::new(ErrorCode::NotFound, "not found"))
}

fn failure(err: ApiError) -> ApiFailure {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    } else {
        warn!(code = ?err.code, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
