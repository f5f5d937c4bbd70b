//! Movement primitives.
//!
//! The two movement kinds share the same columns except for the exercise
//! field: budget movements carry a numeric exercise, execution movements an
//! ISO date. This module holds the shared [`MovementKind`] / [`Exercise`]
//! types plus the budget table entity; the execution table lives in
//! [`crate::executions`].

use std::fmt;

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Budget,
    Execution,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Execution => "execution",
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "budget" => Ok(Self::Budget),
            "execution" => Ok(Self::Execution),
            other => Err(EngineError::InvalidEntry(format!(
                "invalid movement kind: {other}"
            ))),
        }
    }
}

/// Exercise value of a movement, parameterized by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exercise {
    Numeric(i32),
    Date(NaiveDate),
}

impl Exercise {
    /// Parses raw input into the exercise shape the kind requires.
    ///
    /// The error is a plain message so row validation can collect it
    /// alongside the other per-row failures.
    pub fn parse(kind: MovementKind, raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        match kind {
            MovementKind::Budget => trimmed
                .parse::<i32>()
                .map(Self::Numeric)
                .map_err(|_| format!("invalid exercise: '{raw}', expected an integer")),
            MovementKind::Execution => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|_| {
                    format!("invalid exercise: '{raw}', expected an ISO date (YYYY-MM-DD)")
                }),
        }
    }

    pub fn kind(self) -> MovementKind {
        match self {
            Self::Numeric(_) => MovementKind::Budget,
            Self::Date(_) => MovementKind::Execution,
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(year) => write!(f, "{year}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cost_center_id: i32,
    pub budget_line_id: i32,
    pub amount: i64,
    pub user_id: i32,
    pub exercise: i32,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [MovementKind::Budget, MovementKind::Execution] {
            assert_eq!(MovementKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(MovementKind::try_from("ledger").is_err());
    }

    #[test]
    fn exercise_parse_follows_kind() {
        assert_eq!(
            Exercise::parse(MovementKind::Budget, " 2026 ").unwrap(),
            Exercise::Numeric(2026)
        );
        assert_eq!(
            Exercise::parse(MovementKind::Execution, "2026-03-14").unwrap(),
            Exercise::Date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
        );
        assert!(Exercise::parse(MovementKind::Budget, "2026-03-14").is_err());
        assert!(Exercise::parse(MovementKind::Execution, "2026").is_err());
    }

    #[test]
    fn exercise_display_matches_input_shape() {
        assert_eq!(Exercise::Numeric(2026).to_string(), "2026");
        assert_eq!(
            Exercise::Date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()).to_string(),
            "2026-03-14"
        );
    }
}
