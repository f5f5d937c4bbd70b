//! Initial schema migration - creates all tables from scratch.
//!
//! - `cost_centers`: organizational units movements are charged to
//! - `users`: authentication and the cost center each account belongs to
//! - `budget_lines`: the (rubro, pda_gral, pda) catalog
//! - `movements`: budget movements, one row per entry, amount in cents
//! - `executions`: execution movements, dated instead of per-exercise

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum CostCenters {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    CostCenterId,
    Role,
}

#[derive(Iden)]
enum BudgetLines {
    Table,
    Id,
    Rubro,
    PdaGral,
    Pda,
}

#[derive(Iden)]
enum Movements {
    Table,
    Id,
    CostCenterId,
    BudgetLineId,
    Amount,
    UserId,
    Exercise,
    Description,
}

#[derive(Iden)]
enum Executions {
    Table,
    Id,
    CostCenterId,
    BudgetLineId,
    Amount,
    UserId,
    Exercise,
    Description,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Cost centers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CostCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostCenters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CostCenters::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cost_centers-name-unique")
                    .table(CostCenters::Table)
                    .col(CostCenters::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CostCenterId).integer().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-cost_center_id")
                            .from(Users::Table, Users::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Budget lines
        // ───────────────────────────────────────────────────────────────────
        // The (rubro, pda_gral, pda) triple is deliberately NOT unique; the
        // catalog carries historical duplicates and references resolve only
        // when a triple matches exactly one row.
        manager
            .create_table(
                Table::create()
                    .table(BudgetLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetLines::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetLines::Rubro).string().not_null())
                    .col(ColumnDef::new(BudgetLines::PdaGral).string().not_null())
                    .col(ColumnDef::new(BudgetLines::Pda).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_lines-triple")
                    .table(BudgetLines::Table)
                    .col(BudgetLines::Rubro)
                    .col(BudgetLines::PdaGral)
                    .col(BudgetLines::Pda)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Movements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movements::CostCenterId).integer().not_null())
                    .col(ColumnDef::new(Movements::BudgetLineId).integer().not_null())
                    .col(ColumnDef::new(Movements::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Movements::UserId).integer().not_null())
                    .col(ColumnDef::new(Movements::Exercise).integer().not_null())
                    .col(ColumnDef::new(Movements::Description).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-cost_center_id")
                            .from(Movements::Table, Movements::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-budget_line_id")
                            .from(Movements::Table, Movements::BudgetLineId)
                            .to(BudgetLines::Table, BudgetLines::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-user_id")
                            .from(Movements::Table, Movements::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-cost_center_id")
                    .table(Movements::Table)
                    .col(Movements::CostCenterId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Executions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Executions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Executions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Executions::CostCenterId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Executions::BudgetLineId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Executions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Executions::UserId).integer().not_null())
                    .col(ColumnDef::new(Executions::Exercise).date().not_null())
                    .col(ColumnDef::new(Executions::Description).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-executions-cost_center_id")
                            .from(Executions::Table, Executions::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-executions-budget_line_id")
                            .from(Executions::Table, Executions::BudgetLineId)
                            .to(BudgetLines::Table, BudgetLines::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-executions-user_id")
                            .from(Executions::Table, Executions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-executions-cost_center_id")
                    .table(Executions::Table)
                    .col(Executions::CostCenterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Executions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostCenters::Table).to_owned())
            .await?;
        Ok(())
    }
}
