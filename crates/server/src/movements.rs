//! Movement entry, report, export and search endpoints

use api_types::movement::{
    MovementCreated, MovementNew, MovementUpdate as MovementUpdateBody, MovementView,
    ReportResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{MovementEntry, MovementKind, MovementUpdate, ReportRow};

use crate::{ServerError, server::ServerState, session::Session};

/// Parses the `{kind}` path segment; anything else is a bad request.
pub fn parse_kind(raw: &str) -> Result<MovementKind, ServerError> {
    MovementKind::try_from(raw)
        .map_err(|_| ServerError::Generic(format!("unknown movement kind: '{raw}'")))
}

fn view(row: ReportRow) -> MovementView {
    MovementView {
        id: row.id,
        amount: row.amount.to_string(),
        exercise: row.exercise,
        description: row.description,
        rubro: row.rubro,
        pda_gral: row.pda_gral,
        pda: row.pda,
        cost_center: row.cost_center,
        username: row.username,
    }
}

/// Handle manual entry; the operator is always the record's user
pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<MovementCreated>), ServerError> {
    let kind = parse_kind(&kind)?;
    let entry = MovementEntry {
        amount: payload.amount,
        exercise: payload.exercise,
        description: payload.description,
        rubro: payload.rubro,
        pda_gral: payload.pda_gral,
        pda: payload.pda,
        cost_center: payload.cost_center,
    };

    let id = state
        .engine
        .create_movement(&session.scope, kind, &entry)
        .await?;

    Ok((StatusCode::CREATED, Json(MovementCreated { id })))
}

/// Handle report requests: scoped rows plus their total
pub async fn report(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<ReportResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let report = state.engine.report(&session.scope, kind).await?;

    Ok(Json(ReportResponse {
        total: report.total.to_string(),
        movements: report.rows.into_iter().map(view).collect(),
    }))
}

/// Handle CSV export of the current report
pub async fn export(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let kind = parse_kind(&kind)?;
    let csv = state.engine.export_csv(&session.scope, kind).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}_movements.csv\"", kind.as_str()),
            ),
        ],
        csv,
    ))
}

/// Handle search-by-id; out-of-scope rows look absent
pub async fn find(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i32)>,
) -> Result<Json<MovementView>, ServerError> {
    let kind = parse_kind(&kind)?;
    let row = state.engine.find_movement(&session.scope, kind, id).await?;

    Ok(Json(view(row)))
}

/// Handle edits; the body carries the full form, author included
pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i32)>,
    Json(payload): Json<MovementUpdateBody>,
) -> Result<Json<MovementView>, ServerError> {
    let kind = parse_kind(&kind)?;
    let update = MovementUpdate {
        amount: payload.amount,
        exercise: payload.exercise,
        description: payload.description,
        rubro: payload.rubro,
        pda_gral: payload.pda_gral,
        pda: payload.pda,
        cost_center: payload.cost_center,
        username: payload.username,
    };

    state
        .engine
        .update_movement(&session.scope, kind, id, &update)
        .await?;
    let row = state.engine.find_movement(&session.scope, kind, id).await?;

    Ok(Json(view(row)))
}
