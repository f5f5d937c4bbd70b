//! Roles and cost-center scoping.
//!
//! Every operation runs under an [`AccessScope`]: the authenticated user plus
//! its role and home cost center. Standard users only see and touch their own
//! cost center; administrative users see all of them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{CostCenter, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Standard,
    Administrative,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Administrative => "administrative",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "standard" => Ok(Self::Standard),
            "administrative" => Ok(Self::Administrative),
            other => Err(EngineError::InvalidEntry(format!("invalid role: {other}"))),
        }
    }
}

/// The authenticated caller of an engine operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessScope {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub cost_center_id: i32,
}

impl AccessScope {
    #[must_use]
    pub fn is_administrative(&self) -> bool {
        self.role == Role::Administrative
    }
}

/// The cost centers a scope may reference, indexed by name and by id.
#[derive(Clone, Debug, Default)]
pub struct PermittedCostCenters {
    by_name: HashMap<String, i32>,
    ids: HashSet<i32>,
}

impl PermittedCostCenters {
    /// Restricts the full cost-center list to what `scope` may reference:
    /// everything for administrative users, only the home cost center
    /// otherwise.
    #[must_use]
    pub fn restrict(scope: &AccessScope, centers: &[CostCenter]) -> Self {
        let mut permitted = Self::default();
        for center in centers {
            if scope.is_administrative() || center.id == scope.cost_center_id {
                permitted.by_name.insert(center.name.clone(), center.id);
                permitted.ids.insert(center.id);
            }
        }
        permitted
    }

    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn contains_id(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }
}
