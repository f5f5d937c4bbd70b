//! Persistence gateway for the two movement tables.
//!
//! Writes are kind-dispatched: budget movements land in `movements`,
//! execution movements in `executions`. Scoped operations filter by the
//! caller's cost center unless the scope is administrative, so a foreign row
//! simply does not exist from the caller's point of view.

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};

use crate::rows::ResolvedMovement;
use crate::{
    AccessScope, EngineError, Exercise, MovementKind, ResultEngine, executions, movements,
};

/// Inserts one resolved movement and returns its id.
pub(crate) async fn insert_one<C: ConnectionTrait>(
    db: &C,
    kind: MovementKind,
    row: &ResolvedMovement,
) -> ResultEngine<i32> {
    match (kind, row.exercise) {
        (MovementKind::Budget, Exercise::Numeric(exercise)) => {
            let inserted = movements::ActiveModel {
                id: ActiveValue::NotSet,
                cost_center_id: ActiveValue::Set(row.cost_center_id),
                budget_line_id: ActiveValue::Set(row.budget_line_id),
                amount: ActiveValue::Set(row.amount.cents()),
                user_id: ActiveValue::Set(row.user_id),
                exercise: ActiveValue::Set(exercise),
                description: ActiveValue::Set(row.description.clone()),
            }
            .insert(db)
            .await?;
            Ok(inserted.id)
        }
        (MovementKind::Execution, Exercise::Date(exercise)) => {
            let inserted = executions::ActiveModel {
                id: ActiveValue::NotSet,
                cost_center_id: ActiveValue::Set(row.cost_center_id),
                budget_line_id: ActiveValue::Set(row.budget_line_id),
                amount: ActiveValue::Set(row.amount.cents()),
                user_id: ActiveValue::Set(row.user_id),
                exercise: ActiveValue::Set(exercise),
                description: ActiveValue::Set(row.description.clone()),
            }
            .insert(db)
            .await?;
            Ok(inserted.id)
        }
        _ => Err(EngineError::InvalidEntry(
            "exercise shape does not match movement kind".to_string(),
        )),
    }
}

/// Inserts a validated batch row by row and returns the inserted count.
///
/// Run inside a transaction so a mid-batch store failure leaves nothing
/// behind.
pub(crate) async fn insert_batch<C: ConnectionTrait>(
    db: &C,
    kind: MovementKind,
    rows: &[ResolvedMovement],
) -> ResultEngine<usize> {
    for row in rows {
        insert_one(db, kind, row).await?;
    }
    Ok(rows.len())
}

/// Overwrites every data column of one movement, honoring scope.
///
/// A row outside the caller's scope reports as missing.
pub(crate) async fn update_by_id<C: ConnectionTrait>(
    db: &C,
    scope: &AccessScope,
    kind: MovementKind,
    id: i32,
    row: &ResolvedMovement,
) -> ResultEngine<()> {
    match (kind, row.exercise) {
        (MovementKind::Budget, Exercise::Numeric(exercise)) => {
            let mut query = movements::Entity::find_by_id(id);
            if !scope.is_administrative() {
                query = query.filter(movements::Column::CostCenterId.eq(scope.cost_center_id));
            }
            let model = query
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("movement {id}")))?;

            let mut active: movements::ActiveModel = model.into();
            active.cost_center_id = ActiveValue::Set(row.cost_center_id);
            active.budget_line_id = ActiveValue::Set(row.budget_line_id);
            active.amount = ActiveValue::Set(row.amount.cents());
            active.user_id = ActiveValue::Set(row.user_id);
            active.exercise = ActiveValue::Set(exercise);
            active.description = ActiveValue::Set(row.description.clone());
            active.update(db).await?;
            Ok(())
        }
        (MovementKind::Execution, Exercise::Date(exercise)) => {
            let mut query = executions::Entity::find_by_id(id);
            if !scope.is_administrative() {
                query = query.filter(executions::Column::CostCenterId.eq(scope.cost_center_id));
            }
            let model = query
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("movement {id}")))?;

            let mut active: executions::ActiveModel = model.into();
            active.cost_center_id = ActiveValue::Set(row.cost_center_id);
            active.budget_line_id = ActiveValue::Set(row.budget_line_id);
            active.amount = ActiveValue::Set(row.amount.cents());
            active.user_id = ActiveValue::Set(row.user_id);
            active.exercise = ActiveValue::Set(exercise);
            active.description = ActiveValue::Set(row.description.clone());
            active.update(db).await?;
            Ok(())
        }
        _ => Err(EngineError::InvalidEntry(
            "exercise shape does not match movement kind".to_string(),
        )),
    }
}

/// Deletes movements by id within scope and returns how many rows went away.
///
/// Ids outside the caller's scope are silently skipped, which the returned
/// count reflects.
pub(crate) async fn delete_by_ids<C: ConnectionTrait>(
    db: &C,
    scope: &AccessScope,
    kind: MovementKind,
    ids: &[i32],
) -> ResultEngine<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let rows_affected = match kind {
        MovementKind::Budget => {
            let mut delete = movements::Entity::delete_many()
                .filter(movements::Column::Id.is_in(ids.iter().copied()));
            if !scope.is_administrative() {
                delete = delete.filter(movements::Column::CostCenterId.eq(scope.cost_center_id));
            }
            delete.exec(db).await?.rows_affected
        }
        MovementKind::Execution => {
            let mut delete = executions::Entity::delete_many()
                .filter(executions::Column::Id.is_in(ids.iter().copied()));
            if !scope.is_administrative() {
                delete = delete.filter(executions::Column::CostCenterId.eq(scope.cost_center_id));
            }
            delete.exec(db).await?.rows_affected
        }
    };
    Ok(rows_affected)
}
