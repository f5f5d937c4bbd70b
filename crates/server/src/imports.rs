//! Bulk CSV import endpoint

use api_types::movement::ImportResult;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
};

use crate::{ServerError, movements::parse_kind, server::ServerState, session::Session};

/// Handle CSV uploads; the whole batch commits or none of it does
pub async fn import(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<ImportResult>, ServerError> {
    let kind = parse_kind(&kind)?;
    let inserted = state
        .engine
        .import_movements(&session.scope, kind, &body)
        .await?;
    tracing::info!(
        "imported {inserted} {} movement(s) for {}",
        kind.as_str(),
        session.scope.username
    );

    Ok(Json(ImportResult { inserted }))
}
