//! Movement operations: manual entry, report, export, search, edit, delete.

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::report::{self, ExecutionLabels, view};
use crate::rows::{self, CostCenterRef, RowContext, RowInput};
use crate::{
    AccessScope, EngineError, MovementKind, Report, ReportRow, ResultEngine, executions, store,
};

use super::{Engine, with_tx};

/// Fields of a manually entered movement. The operator is recorded as the
/// movement's user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementEntry {
    pub amount: String,
    pub exercise: String,
    pub description: String,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
    pub cost_center: String,
}

/// Full replacement payload for the search-and-edit flow. Unlike manual
/// entry it can reassign the movement to another user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementUpdate {
    pub amount: String,
    pub exercise: String,
    pub description: String,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
    pub cost_center: String,
    pub username: String,
}

impl Engine {
    /// Validates and inserts one manually entered movement, returning its id.
    pub async fn create_movement(
        &self,
        scope: &AccessScope,
        kind: MovementKind,
        entry: &MovementEntry,
    ) -> ResultEngine<i32> {
        let (permitted, users_by_name, budget_lines) = self.row_context_parts(scope).await?;
        let ctx = RowContext {
            permitted: &permitted,
            users: &users_by_name,
            budget_lines: &budget_lines,
        };
        let row = RowInput {
            amount: entry.amount.clone(),
            exercise: entry.exercise.clone(),
            description: entry.description.clone(),
            rubro: entry.rubro.clone(),
            pda_gral: entry.pda_gral.clone(),
            pda: entry.pda.clone(),
            cost_center: CostCenterRef::Name(entry.cost_center.clone()),
            username: scope.username.clone(),
        };
        let resolved = rows::resolve_row(kind, &row, &ctx).map_err(EngineError::InvalidEntry)?;

        with_tx!(self, |db_tx| {
            let id = store::insert_one(&db_tx, kind, &resolved).await?;
            Ok(id)
        })
    }

    /// Lists the movements visible to `scope`, newest first, with the sum of
    /// their amounts.
    pub async fn report(&self, scope: &AccessScope, kind: MovementKind) -> ResultEngine<Report> {
        let rows = match kind {
            MovementKind::Budget => {
                let mut query = view::Entity::find().order_by_desc(view::Column::Id);
                if !scope.is_administrative() {
                    query = query.filter(view::Column::CostCenterId.eq(scope.cost_center_id));
                }
                query
                    .all(&self.database)
                    .await?
                    .into_iter()
                    .map(ReportRow::from)
                    .collect()
            }
            MovementKind::Execution => {
                let mut query = executions::Entity::find().order_by_desc(executions::Column::Id);
                if !scope.is_administrative() {
                    query =
                        query.filter(executions::Column::CostCenterId.eq(scope.cost_center_id));
                }
                let models = query.all(&self.database).await?;

                let centers = self.cached_cost_centers().await?;
                let users = self.cached_users().await?;
                let lines = self.cached_budget_lines().await?;
                let labels = ExecutionLabels {
                    cost_centers: &centers,
                    users: &users,
                    budget_lines: &lines,
                };
                models
                    .into_iter()
                    .map(|model| report::decorate_execution(model, &labels))
                    .collect()
            }
        };
        Ok(Report::from_rows(rows))
    }

    /// Renders the caller's current report as a CSV document.
    pub async fn export_csv(&self, scope: &AccessScope, kind: MovementKind) -> ResultEngine<String> {
        let report = self.report(scope, kind).await?;
        report::to_csv(&report)
    }

    /// Fetches one movement by id within scope, decorated for display.
    ///
    /// A row outside the caller's scope reports as missing, same as an
    /// absent id.
    pub async fn find_movement(
        &self,
        scope: &AccessScope,
        kind: MovementKind,
        id: i32,
    ) -> ResultEngine<ReportRow> {
        let missing = || EngineError::KeyNotFound(format!("movement {id}"));
        match kind {
            MovementKind::Budget => {
                let mut query = view::Entity::find_by_id(id);
                if !scope.is_administrative() {
                    query = query.filter(view::Column::CostCenterId.eq(scope.cost_center_id));
                }
                query
                    .one(&self.database)
                    .await?
                    .map(ReportRow::from)
                    .ok_or_else(missing)
            }
            MovementKind::Execution => {
                let mut query = executions::Entity::find_by_id(id);
                if !scope.is_administrative() {
                    query =
                        query.filter(executions::Column::CostCenterId.eq(scope.cost_center_id));
                }
                let model = query.one(&self.database).await?.ok_or_else(missing)?;

                let centers = self.cached_cost_centers().await?;
                let users = self.cached_users().await?;
                let lines = self.cached_budget_lines().await?;
                let labels = ExecutionLabels {
                    cost_centers: &centers,
                    users: &users,
                    budget_lines: &lines,
                };
                Ok(report::decorate_execution(model, &labels))
            }
        }
    }

    /// Replaces every data field of one movement within scope.
    pub async fn update_movement(
        &self,
        scope: &AccessScope,
        kind: MovementKind,
        id: i32,
        update: &MovementUpdate,
    ) -> ResultEngine<()> {
        let (permitted, users_by_name, budget_lines) = self.row_context_parts(scope).await?;
        let ctx = RowContext {
            permitted: &permitted,
            users: &users_by_name,
            budget_lines: &budget_lines,
        };
        let row = RowInput {
            amount: update.amount.clone(),
            exercise: update.exercise.clone(),
            description: update.description.clone(),
            rubro: update.rubro.clone(),
            pda_gral: update.pda_gral.clone(),
            pda: update.pda.clone(),
            cost_center: CostCenterRef::Name(update.cost_center.clone()),
            username: update.username.clone(),
        };
        let resolved = rows::resolve_row(kind, &row, &ctx).map_err(EngineError::InvalidEntry)?;

        with_tx!(self, |db_tx| {
            store::update_by_id(&db_tx, scope, kind, id, &resolved).await?;
            Ok(())
        })
    }

    /// Deletes the given movements within scope and returns the deleted
    /// count. Ids outside scope are skipped, not errors.
    pub async fn delete_movements(
        &self,
        scope: &AccessScope,
        kind: MovementKind,
        ids: &[i32],
    ) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let deleted = store::delete_by_ids(&db_tx, scope, kind, ids).await?;
            Ok(deleted)
        })
    }
}
