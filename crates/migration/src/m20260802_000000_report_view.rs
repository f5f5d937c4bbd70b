//! Creates `vw_movements`, the denormalized read model for budget reports.
//!
//! The view joins each movement to its budget line triple, cost center name
//! and author username so report queries stay single-table. Joins are LEFT
//! joins: a dangling reference surfaces as NULL instead of hiding the row.

use sea_orm::{ConnectionTrait, DbErr, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        db.execute(Statement::from_string(
            backend,
            "CREATE VIEW vw_movements AS \
             SELECT m.id, \
                    m.cost_center_id, \
                    m.amount, \
                    m.exercise, \
                    m.description, \
                    b.rubro, \
                    b.pda_gral, \
                    b.pda, \
                    c.name AS cost_center, \
                    u.username \
             FROM movements m \
             LEFT JOIN budget_lines b ON b.id = m.budget_line_id \
             LEFT JOIN cost_centers c ON c.id = m.cost_center_id \
             LEFT JOIN users u ON u.id = m.user_id;"
                .to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        db.execute(Statement::from_string(
            backend,
            "DROP VIEW vw_movements;".to_string(),
        ))
        .await?;

        Ok(())
    }
}
