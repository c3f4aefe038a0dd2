//! Status endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub online: usize,
}

/// GET / - Liveness and current online count
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Anonymous chat backend is running",
        online: state.online(),
    })
}

/// GET /test - Static payload kept for older frontends
pub async fn get_test() -> Json<Value> {
    Json(json!({
        "backend": "✅ Running",
        "database": "❌ Not Used",
        "database_url": null,
        "database_name": null,
        "connection_status": "N/A",
        "collections": [],
    }))
}
