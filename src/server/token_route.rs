use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use crate::helper::RunHelper;
use crate::provider::bearer;
use crate::server::server::AppState;

pub const TOKEN_PATH: &str = "/token";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Serialize)]
struct TokenResponse {
    authorization: String,
    expires_at: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    reason: &'static str,
    error: String,
}

pub fn router<R: RunHelper>() -> Router<AppState<R>> {
    Router::new()
        .route(TOKEN_PATH, get(get_token::<R>))
        .route(HEALTH_PATH, get(|| async { "ok" }))
}

async fn get_token<R: RunHelper>(State(state): State<AppState<R>>) -> Response {
    let token = state
        .provider
        .token()
        .await
        .and_then(|token_state| Ok((bearer(&token_state)?, token_state.expiry)));

    match token {
        Ok((header, expiry)) => {
            let body = TokenResponse {
                authorization: String::from_utf8_lossy(header.as_bytes()).into_owned(),
                expires_at: expiry.to_rfc3339(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            warn!(reason = err.reason(), "token request failed");
            let body = ErrorResponse { reason: err.reason(), error: err.to_string() };
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}
