//! Report rows and CSV export.
//!
//! Budget movements are read through the `vw_movements` view, which joins
//! the foreign-key labels in at the store layer. Executions have no view;
//! their rows are decorated client-side from the lookup tables, with the
//! same left-join semantics (a dangling reference shows as an empty label).

use crate::{BudgetLine, CostCenter, EngineError, MoneyCents, ResultEngine, UserRef, executions};

pub(crate) mod view {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "vw_movements")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub cost_center_id: i32,
        pub amount: i64,
        pub exercise: i32,
        pub description: String,
        pub rubro: Option<String>,
        pub pda_gral: Option<String>,
        pub pda: Option<String>,
        pub cost_center: Option<String>,
        pub username: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// One movement as displayed: labels in place of foreign keys, the exercise
/// rendered in its kind's shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub id: i32,
    pub amount: MoneyCents,
    pub exercise: String,
    pub description: String,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
    pub cost_center: String,
    pub username: String,
}

/// A scoped result set plus the sum of its amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub total: MoneyCents,
}

impl Report {
    pub(crate) fn from_rows(rows: Vec<ReportRow>) -> Self {
        let total = rows
            .iter()
            .fold(MoneyCents::ZERO, |total, row| total + row.amount);
        Self { rows, total }
    }
}

const EXPORT_HEADERS: [&str; 9] = [
    "id",
    "amount",
    "exercise",
    "description",
    "rubro",
    "pda_gral",
    "pda",
    "cost_center",
    "username",
];

/// Serializes a report to CSV with the canonical column names, so the file
/// re-imports as-is (the `id` column is ignored on import).
pub(crate) fn to_csv(report: &Report) -> ResultEngine<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|err| EngineError::InvalidEntry(err.to_string()))?;
    for row in &report.rows {
        writer
            .write_record([
                row.id.to_string().as_str(),
                row.amount.to_string().as_str(),
                row.exercise.as_str(),
                row.description.as_str(),
                row.rubro.as_str(),
                row.pda_gral.as_str(),
                row.pda.as_str(),
                row.cost_center.as_str(),
                row.username.as_str(),
            ])
            .map_err(|err| EngineError::InvalidEntry(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| EngineError::InvalidEntry(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| EngineError::InvalidEntry(err.to_string()))
}

impl From<view::Model> for ReportRow {
    fn from(model: view::Model) -> Self {
        Self {
            id: model.id,
            amount: MoneyCents::new(model.amount),
            exercise: model.exercise.to_string(),
            description: model.description,
            rubro: model.rubro.unwrap_or_default(),
            pda_gral: model.pda_gral.unwrap_or_default(),
            pda: model.pda.unwrap_or_default(),
            cost_center: model.cost_center.unwrap_or_default(),
            username: model.username.unwrap_or_default(),
        }
    }
}

/// Labels for the client-side decoration of execution rows.
pub(crate) struct ExecutionLabels<'a> {
    pub cost_centers: &'a [CostCenter],
    pub users: &'a [UserRef],
    pub budget_lines: &'a [BudgetLine],
}

pub(crate) fn decorate_execution(
    model: executions::Model,
    labels: &ExecutionLabels<'_>,
) -> ReportRow {
    let line = labels
        .budget_lines
        .iter()
        .find(|line| line.id == model.budget_line_id);
    let cost_center = labels
        .cost_centers
        .iter()
        .find(|center| center.id == model.cost_center_id)
        .map(|center| center.name.clone())
        .unwrap_or_default();
    let username = labels
        .users
        .iter()
        .find(|user| user.id == model.user_id)
        .map(|user| user.username.clone())
        .unwrap_or_default();

    ReportRow {
        id: model.id,
        amount: MoneyCents::new(model.amount),
        exercise: model.exercise.to_string(),
        description: model.description,
        rubro: line.map(|l| l.rubro.clone()).unwrap_or_default(),
        pda_gral: line.map(|l| l.pda_gral.clone()).unwrap_or_default(),
        pda: line.map(|l| l.pda.clone()).unwrap_or_default(),
        cost_center,
        username,
    }
}
