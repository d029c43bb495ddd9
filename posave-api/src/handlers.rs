use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use log::debug;
use posave_store::model::SaveReply;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

const ALLOWED_METHODS: &str = "GET,POST,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// JSON body plus the open CORS pair. Only JSON replies carry CORS headers.
fn cors_json<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
        Json(body),
    )
        .into_response()
}

/// Runs before routing. OPTIONS on any path is a preflight; HEAD is never
/// routed, since `get` routes would otherwise answer it.
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::HEAD {
        return not_found().await;
    }
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
        .into_response()
}

// Re-read on every hit so edits show up without a restart.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read(&state.html_file).await {
        Ok(html) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(e) => {
            debug!("Cannot read {:?}: {e}", state.html_file);
            (StatusCode::INTERNAL_SERVER_ERROR, "Cannot read index.html").into_response()
        }
    }
}

pub async fn load(State(state): State<Arc<AppState>>) -> Response {
    cors_json(StatusCode::OK, state.repository.load().await)
}

pub async fn save(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Save body could not be read: {rejection}");
            return cors_json(
                StatusCode::BAD_REQUEST,
                SaveReply::failed(rejection.body_text()),
            );
        }
    };

    match state.repository.save_raw(&body).await {
        Ok(()) => cors_json(StatusCode::OK, SaveReply::saved()),
        Err(e) => {
            debug!("Save rejected: {e}");
            cors_json(StatusCode::BAD_REQUEST, SaveReply::failed(e))
        }
    }
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
