//! Directory registration endpoint.
//!
//! User management proper is outside the engine; this is the minimal wiring
//! the in-memory directory needs so carts and checkouts have a user to
//! belong to.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::UserId;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub user_id: String,
}

/// POST /users — register a new user and return its id.
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<UserCreatedResponse>) {
    let user_id = state.directory.register(UserId::new()).await;

    (
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            user_id: user_id.to_string(),
        }),
    )
}
