use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::debug;

use memlog_protocol::QueryParams;
use memlog_storage::{Capacity, Entry, LogStore};

use crate::assets;
use crate::status::resident_memory_bytes;

const MB: f64 = 1024.0 * 1024.0;

/// Estado compartilhado pelos handlers HTTP.
#[derive(Clone)]
pub struct AppState {
    pub store: LogStore,
    pub tcp_port: u16,
    pub http_port: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub items: Vec<Entry>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub cache_count: usize,
    pub cache_size_bytes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub log_count: usize,
    pub http_port: u16,
    pub tcp_port: u16,
    pub cache_size_bytes: usize,
    #[serde(rename = "cacheSizeMB")]
    pub cache_size_mb: f64,
    pub capacity: Capacity,
}

/// Monta o router com a API e a UI estática.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/logs", get(get_logs).delete(clear_logs))
        .route("/api/status", get(get_status))
        .route("/api/health", get(health))
        .fallback(assets::static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Parâmetros malformados nunca viram erro: sem query string válida, valem
// os defaults.
async fn get_logs(
    State(state): State<AppState>,
    pairs: Option<Query<Vec<(String, String)>>>,
) -> Json<LogsResponse> {
    let pairs = pairs.map(|Query(p)| p).unwrap_or_default();
    let options = QueryParams::from_pairs(pairs).into_options();
    debug!("consulta: {options:?}");

    let result = state.store.query(&options).await;
    Json(LogsResponse {
        items: result.items,
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        cache_count: result.usage.entries,
        cache_size_bytes: result.usage.bytes,
    })
}

async fn clear_logs(State(state): State<AppState>) -> Json<Value> {
    state.store.clear().await;
    debug!("store limpo via API");
    Json(json!({ "message": "logs cleared" }))
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let usage = state.store.usage().await;
    let memory = resident_memory_bytes().await.unwrap_or(0);

    Json(StatusResponse {
        status: "running",
        memory_mb: memory as f64 / MB,
        log_count: usage.entries,
        http_port: state.http_port,
        tcp_port: state.tcp_port,
        cache_size_bytes: usage.bytes,
        cache_size_mb: usage.bytes as f64 / MB,
        capacity: state.store.capacity(),
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
