//! Executions table (minimal entity).
//!
//! Same shape as `movements`, with a date-typed exercise column.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "executions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cost_center_id: i32,
    pub budget_line_id: i32,
    pub amount: i64,
    pub user_id: i32,
    pub exercise: Date,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
