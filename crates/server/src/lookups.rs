//! Lookup API endpoints

use api_types::lookups::{BudgetLineView, CostCenterView, LookupsResponse, UserRefView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{server::ServerState, session::Session};

#[derive(Debug, Deserialize)]
pub struct LookupsQuery {
    #[serde(default)]
    refresh: bool,
}

/// Handle requests for the entry-form reference tables
///
/// Never fails: a table that could not be loaded arrives empty with a
/// message in `errors`.
pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<LookupsQuery>,
) -> Json<LookupsResponse> {
    if query.refresh {
        state.engine.refresh_lookups();
    }

    let lookups = state.engine.lookups(&session.scope).await;

    Json(LookupsResponse {
        cost_centers: lookups
            .cost_centers
            .into_iter()
            .map(|c| CostCenterView {
                id: c.id,
                name: c.name,
            })
            .collect(),
        users: lookups
            .users
            .into_iter()
            .map(|u| UserRefView {
                id: u.id,
                username: u.username,
            })
            .collect(),
        budget_lines: lookups
            .budget_lines
            .into_iter()
            .map(|b| BudgetLineView {
                id: b.id,
                rubro: b.rubro,
                pda_gral: b.pda_gral,
                pda: b.pda,
            })
            .collect(),
        errors: lookups.errors,
    })
}
