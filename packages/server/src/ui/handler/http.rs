//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    domain::{Lobby, ParticipantId, ThoughtText},
    infrastructure::dto::http::SearchResultDto,
    ui::state::AppState,
    usecase::WithdrawThoughtError,
};

/// Query parameters for thought submission
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub user_id: String,
    pub query: String,
}

/// Submit (or replace) the caller's thought and return the candidate set
/// ranked against it.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResultDto>>, StatusCode> {
    let (Ok(participant_id), Ok(thought_text)) = (
        ParticipantId::try_from(query.user_id),
        ThoughtText::try_from(query.query),
    ) else {
        return Err(StatusCode::BAD_REQUEST);
    };

    match state
        .submit_thought_usecase
        .execute(participant_id, thought_text)
        .await
    {
        Ok(ranked) => Ok(Json(ranked.into_iter().map(Into::into).collect())),
        Err(e) => {
            tracing::warn!("Thought submission failed: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Withdraw the caller's thought if the text matches the current one.
pub async fn withdraw_thought(
    State(state): State<Arc<AppState>>,
    Path((user_id, query)): Path<(String, String)>,
) -> StatusCode {
    let Ok(participant_id) = ParticipantId::try_from(user_id) else {
        return StatusCode::BAD_REQUEST;
    };

    match state
        .withdraw_thought_usecase
        .execute(&participant_id, &query)
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(WithdrawThoughtError::ThoughtNotFound) => StatusCode::NOT_FOUND,
    }
}

/// Debug endpoint to get current lobby state (for testing purposes)
pub async fn debug_lobby_state(State(state): State<Arc<AppState>>) -> Json<Lobby> {
    Json(state.repository.get_lobby().await)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
