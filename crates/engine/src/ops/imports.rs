//! Bulk import of movements from uploaded files.

use sea_orm::TransactionTrait;

use crate::rows::{self, RowContext};
use crate::{AccessScope, EngineError, MovementKind, ResultEngine, import, store};

use super::{Engine, with_tx};

impl Engine {
    /// Validates an uploaded CSV batch and inserts it atomically.
    ///
    /// A broken file fails as a whole. A non-administrative batch that
    /// references a foreign cost center is rejected before row validation.
    /// Otherwise every row is validated and any failure rejects the batch
    /// with the full per-row error list; only a fully valid batch is
    /// written, inside one transaction.
    pub async fn import_movements(
        &self,
        scope: &AccessScope,
        kind: MovementKind,
        data: &[u8],
    ) -> ResultEngine<usize> {
        let parsed = import::parse_rows(data)?;
        if parsed.is_empty() {
            return Ok(0);
        }

        let (permitted, users_by_name, budget_lines) = self.row_context_parts(scope).await?;
        rows::precheck_scope(scope, &permitted, &parsed)?;

        let ctx = RowContext {
            permitted: &permitted,
            users: &users_by_name,
            budget_lines: &budget_lines,
        };
        let resolved =
            rows::resolve_batch(kind, &parsed, &ctx).map_err(EngineError::BatchRejected)?;

        with_tx!(self, |db_tx| {
            let inserted = store::insert_batch(&db_tx, kind, &resolved).await?;
            Ok(inserted)
        })
    }
}
