//! Reference-data lookups through the read-through cache.
//!
//! The three tables feeding the entry forms are fetched at most once per
//! validity window. Writes do not invalidate the cache; the operator asks
//! for a refresh when new reference data should show up.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    AccessScope, BudgetLine, CostCenter, PermittedCostCenters, ResultEngine, UserRef,
    budget_lines, cost_centers, users,
};

use super::Engine;

/// Dropdown data for the entry forms, cost centers already scoped to the
/// caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookups {
    pub cost_centers: Vec<CostCenter>,
    pub users: Vec<UserRef>,
    pub budget_lines: Vec<BudgetLine>,
    /// One message per reference table that failed to load this round. The
    /// affected list is empty rather than the whole call failing.
    pub errors: Vec<String>,
}

impl Engine {
    /// Returns the dropdown data visible to `scope`.
    pub async fn lookups(&self, scope: &AccessScope) -> Lookups {
        let mut errors = Vec::new();

        let cost_centers = match self.cached_cost_centers().await {
            Ok(rows) => rows
                .iter()
                .filter(|center| scope.is_administrative() || center.id == scope.cost_center_id)
                .cloned()
                .collect(),
            Err(err) => {
                errors.push(format!("failed to load cost centers: {err}"));
                Vec::new()
            }
        };
        let users = match self.cached_users().await {
            Ok(rows) => rows.as_ref().clone(),
            Err(err) => {
                errors.push(format!("failed to load users: {err}"));
                Vec::new()
            }
        };
        let budget_lines = match self.cached_budget_lines().await {
            Ok(rows) => rows.as_ref().clone(),
            Err(err) => {
                errors.push(format!("failed to load budget lines: {err}"));
                Vec::new()
            }
        };

        Lookups {
            cost_centers,
            users,
            budget_lines,
            errors,
        }
    }

    /// Drops the cached reference data; the next read refetches.
    pub fn refresh_lookups(&self) {
        self.lookups.clear();
    }

    /// Lookup data the row validator needs, with cost centers restricted to
    /// the caller's scope. Unlike [`Engine::lookups`] a fetch failure is an
    /// error here: a write path must not run against half-loaded data.
    pub(super) async fn row_context_parts(
        &self,
        scope: &AccessScope,
    ) -> ResultEngine<(PermittedCostCenters, HashMap<String, i32>, Arc<Vec<BudgetLine>>)> {
        let centers = self.cached_cost_centers().await?;
        let users = self.cached_users().await?;
        let lines = self.cached_budget_lines().await?;

        let permitted = PermittedCostCenters::restrict(scope, &centers);
        let users_by_name = users
            .iter()
            .map(|user| (user.username.clone(), user.id))
            .collect();
        Ok((permitted, users_by_name, lines))
    }

    pub(super) async fn cached_cost_centers(&self) -> ResultEngine<Arc<Vec<CostCenter>>> {
        if let Some(rows) = self.lookups.fresh_cost_centers() {
            return Ok(rows);
        }
        let models = cost_centers::Entity::find().all(&self.database).await?;
        Ok(self
            .lookups
            .store_cost_centers(models.into_iter().map(CostCenter::from).collect()))
    }

    pub(super) async fn cached_users(&self) -> ResultEngine<Arc<Vec<UserRef>>> {
        if let Some(rows) = self.lookups.fresh_users() {
            return Ok(rows);
        }
        let models = users::Entity::find().all(&self.database).await?;
        Ok(self
            .lookups
            .store_users(models.into_iter().map(UserRef::from).collect()))
    }

    pub(super) async fn cached_budget_lines(&self) -> ResultEngine<Arc<Vec<BudgetLine>>> {
        if let Some(rows) = self.lookups.fresh_budget_lines() {
            return Ok(rows);
        }
        let models = budget_lines::Entity::find().all(&self.database).await?;
        Ok(self
            .lookups
            .store_budget_lines(models.into_iter().map(BudgetLine::from).collect()))
    }
}
