//! Budget lines table.
//!
//! A budget line is identified to users by the `(rubro, pda_gral, pda)`
//! triple. The triple is **not** unique in the table; movement input is only
//! accepted when it matches exactly one line.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: i32,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BudgetLine {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            rubro: model.rubro,
            pda_gral: model.pda_gral,
            pda: model.pda,
        }
    }
}
