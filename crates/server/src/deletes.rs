//! Staged deletion endpoints: mark, then confirm or cancel

use api_types::movement::{DeleteStage, DeletedResponse, StagedResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, movements::parse_kind, server::ServerState, session::Session};

/// Handle staging a set of ids for deletion; nothing is removed yet
pub async fn stage(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(payload): Json<DeleteStage>,
) -> Result<Json<StagedResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let staged = state
        .sessions
        .stage_deletes(&session.token, kind, payload.ids);

    Ok(Json(StagedResponse { staged }))
}

/// Handle confirming the staged deletion for this session
pub async fn confirm(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let ids = state.sessions.take_deletes(&session.token, kind);
    let deleted = state
        .engine
        .delete_movements(&session.scope, kind, &ids)
        .await?;
    tracing::info!(
        "deleted {deleted} {} movement(s) for {}",
        kind.as_str(),
        session.scope.username
    );

    Ok(Json(DeletedResponse { deleted }))
}

/// Handle cancelling the staged deletion; rows are left untouched
pub async fn cancel(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<StatusCode, ServerError> {
    let kind = parse_kind(&kind)?;
    state.sessions.clear_deletes(&session.token, kind);

    Ok(StatusCode::NO_CONTENT)
}
