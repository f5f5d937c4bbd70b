use serde::{Deserialize, Serialize};

pub mod session {
    use super::*;

    /// Role of an authenticated user.
    ///
    /// The server treats roles as:
    /// - `administrative`: sees every cost center and may import/export freely.
    /// - `standard`: restricted to the cost center of their own account.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Standard,
        Administrative,
    }

    impl Role {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Standard => "standard",
                Self::Administrative => "administrative",
            }
        }
    }

    /// Request body for opening a session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    /// A logged-in user as echoed back by the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub role: Role,
        pub cost_center_id: i32,
    }

    /// Response body for a successful login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        /// Opaque bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserView,
    }
}

pub mod lookups {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostCenterView {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRefView {
        pub id: i32,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetLineView {
        pub id: i32,
        pub rubro: String,
        pub pda_gral: String,
        pub pda: String,
    }

    /// The reference tables an entry form needs, in one round trip.
    ///
    /// A table that failed to load arrives empty, with a message in `errors`;
    /// the response itself never fails.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LookupsResponse {
        pub cost_centers: Vec<CostCenterView>,
        pub users: Vec<UserRefView>,
        pub budget_lines: Vec<BudgetLineView>,
        pub errors: Vec<String>,
    }
}

pub mod movement {
    use super::*;

    /// Request body for creating a movement.
    ///
    /// Every field is the raw user-typed string; the server validates and
    /// coerces. `exercise` is a year for budget movements and an ISO date
    /// (YYYY-MM-DD) for execution movements.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementNew {
        pub amount: String,
        pub exercise: String,
        pub description: String,
        pub rubro: String,
        pub pda_gral: String,
        pub pda: String,
        pub cost_center: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementCreated {
        pub id: i32,
    }

    /// Request body for replacing a movement.
    ///
    /// Unlike [`MovementNew`] the author is editable.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementUpdate {
        pub amount: String,
        pub exercise: String,
        pub description: String,
        pub rubro: String,
        pub pda_gral: String,
        pub pda: String,
        pub cost_center: String,
        pub username: String,
    }

    /// A movement as rendered in reports.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub id: i32,
        /// Signed decimal string, two fraction digits ("-12.50").
        pub amount: String,
        pub exercise: String,
        pub description: String,
        pub rubro: String,
        pub pda_gral: String,
        pub pda: String,
        pub cost_center: String,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportResponse {
        pub movements: Vec<MovementView>,
        /// Sum of all listed amounts, same decimal format.
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportResult {
        pub inserted: usize,
    }

    /// Request body for staging a deletion; confirm or cancel afterwards.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteStage {
        pub ids: Vec<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StagedResponse {
        pub staged: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeletedResponse {
        pub deleted: u64,
    }
}
