use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, render};

pub async fn not_found(State(state): State<AppState>) -> Response {
    match render::render_page(&state, "404", "not_found", json!({}), None) {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Html("store: ok".to_string())).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "store ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("store error: {e}")),
            )
                .into_response()
        }
    }
}
