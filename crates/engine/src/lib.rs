pub use access::{AccessScope, PermittedCostCenters, Role};
pub use budget_lines::BudgetLine;
pub use cost_centers::CostCenter;
pub use error::EngineError;
pub use money::MoneyCents;
pub use movements::{Exercise, MovementKind};
pub use ops::{Engine, EngineBuilder, Lookups, MovementEntry, MovementUpdate, hash_password};
pub use report::{Report, ReportRow};
pub use users::UserRef;

mod access;
mod budget_lines;
mod cost_centers;
mod error;
mod executions;
mod import;
mod lookup;
mod money;
mod movements;
mod ops;
mod report;
mod rows;
mod store;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
