//! Row validation and mapping for movement input.
//!
//! Every movement write (manual form or bulk import) flows through
//! [`resolve_row`]: natural keys are resolved against the lookup tables,
//! scalar fields are coerced, and the result is a [`ResolvedMovement`] ready
//! for the persistence layer. Failures are plain messages so a batch can
//! collect one per row.

use std::collections::HashMap;

use crate::{
    AccessScope, BudgetLine, EngineError, Exercise, MoneyCents, MovementKind,
    PermittedCostCenters, ResultEngine,
};

/// Cost-center reference as it appears in the input: either a name or a raw
/// id string. The id stays unparsed until resolution so a garbled value
/// becomes a row error instead of a file error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CostCenterRef {
    Name(String),
    Id(String),
}

impl CostCenterRef {
    fn raw(&self) -> &str {
        match self {
            Self::Name(value) | Self::Id(value) => value,
        }
    }
}

/// One logical input row, still unvalidated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RowInput {
    pub amount: String,
    pub exercise: String,
    pub description: String,
    pub rubro: String,
    pub pda_gral: String,
    pub pda: String,
    pub cost_center: CostCenterRef,
    pub username: String,
}

/// A fully resolved movement, ready to insert or update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedMovement {
    pub cost_center_id: i32,
    pub budget_line_id: i32,
    pub amount: MoneyCents,
    pub user_id: i32,
    pub exercise: Exercise,
    pub description: String,
}

/// Lookup data a row resolves against. The cost centers are already
/// restricted to the caller's scope; users and budget lines are global.
pub(crate) struct RowContext<'a> {
    pub permitted: &'a PermittedCostCenters,
    pub users: &'a HashMap<String, i32>,
    pub budget_lines: &'a [BudgetLine],
}

/// Resolves one row, short-circuiting on the first failing step.
pub(crate) fn resolve_row(
    kind: MovementKind,
    row: &RowInput,
    ctx: &RowContext<'_>,
) -> Result<ResolvedMovement, String> {
    let cost_center_id = resolve_cost_center(&row.cost_center, ctx.permitted).ok_or_else(|| {
        format!(
            "invalid or unauthorized cost center: '{}'",
            row.cost_center.raw()
        )
    })?;

    let budget_line_id = resolve_budget_line(row, ctx.budget_lines)?;

    let username = row.username.trim();
    let user_id = *ctx
        .users
        .get(username)
        .ok_or_else(|| format!("unknown username: '{username}'"))?;

    let amount: MoneyCents = row
        .amount
        .parse()
        .map_err(|_| format!("invalid amount: '{}'", row.amount))?;
    let exercise = Exercise::parse(kind, &row.exercise)?;

    Ok(ResolvedMovement {
        cost_center_id,
        budget_line_id,
        amount,
        user_id,
        exercise,
        description: row.description.trim().to_string(),
    })
}

/// Resolves a whole batch, tagging failures with their 1-based row position.
///
/// Every row is validated even after a failure; any collected error rejects
/// the whole batch.
pub(crate) fn resolve_batch(
    kind: MovementKind,
    rows: &[RowInput],
    ctx: &RowContext<'_>,
) -> Result<Vec<ResolvedMovement>, Vec<String>> {
    let mut resolved = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match resolve_row(kind, row, ctx) {
            Ok(movement) => resolved.push(movement),
            Err(message) => errors.push(format!("row {}: {message}", idx + 1)),
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(errors)
    }
}

/// Import pre-check: a non-administrative batch may only reference the
/// caller's own cost center. The first violation aborts before the per-row
/// loop runs.
///
/// An id that does not even parse is left for row validation; it is garbage,
/// not a scope violation.
pub(crate) fn precheck_scope(
    scope: &AccessScope,
    permitted: &PermittedCostCenters,
    rows: &[RowInput],
) -> ResultEngine<()> {
    if scope.is_administrative() {
        return Ok(());
    }

    for (idx, row) in rows.iter().enumerate() {
        let in_scope = match &row.cost_center {
            CostCenterRef::Name(name) => permitted.id_for_name(name.trim()).is_some(),
            CostCenterRef::Id(raw) => match raw.trim().parse::<i32>() {
                Ok(id) => permitted.contains_id(id),
                Err(_) => true,
            },
        };
        if !in_scope {
            return Err(EngineError::Forbidden(format!(
                "row {}: cost center '{}' is outside your scope",
                idx + 1,
                row.cost_center.raw()
            )));
        }
    }

    Ok(())
}

fn resolve_cost_center(reference: &CostCenterRef, permitted: &PermittedCostCenters) -> Option<i32> {
    match reference {
        CostCenterRef::Name(name) => permitted.id_for_name(name.trim()),
        CostCenterRef::Id(raw) => {
            let id = raw.trim().parse::<i32>().ok()?;
            permitted.contains_id(id).then_some(id)
        }
    }
}

fn resolve_budget_line(row: &RowInput, lines: &[BudgetLine]) -> Result<i32, String> {
    let rubro = row.rubro.trim();
    let pda_gral = row.pda_gral.trim();
    let pda = row.pda.trim();

    let matches: Vec<&BudgetLine> = lines
        .iter()
        .filter(|line| line.rubro == rubro && line.pda_gral == pda_gral && line.pda == pda)
        .collect();

    match matches.as_slice() {
        [line] => Ok(line.id),
        found => Err(format!(
            "budget line ({rubro}, {pda_gral}, {pda}) matched {} rows, expected exactly one",
            found.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn ctx_fixture() -> (PermittedCostCenters, HashMap<String, i32>, Vec<BudgetLine>) {
        let scope = admin_scope();
        let centers = vec![
            crate::CostCenter {
                id: 1,
                name: "Tesoreria".to_string(),
            },
            crate::CostCenter {
                id: 2,
                name: "Obras".to_string(),
            },
        ];
        let permitted = PermittedCostCenters::restrict(&scope, &centers);
        let users = HashMap::from([("ana".to_string(), 10), ("luis".to_string(), 11)]);
        let lines = vec![
            BudgetLine {
                id: 100,
                rubro: "1".to_string(),
                pda_gral: "01".to_string(),
                pda: "001".to_string(),
            },
            BudgetLine {
                id: 101,
                rubro: "1".to_string(),
                pda_gral: "01".to_string(),
                pda: "002".to_string(),
            },
            BudgetLine {
                id: 102,
                rubro: "2".to_string(),
                pda_gral: "05".to_string(),
                pda: "001".to_string(),
            },
            BudgetLine {
                id: 103,
                rubro: "2".to_string(),
                pda_gral: "05".to_string(),
                pda: "001".to_string(),
            },
        ];
        (permitted, users, lines)
    }

    fn admin_scope() -> AccessScope {
        AccessScope {
            user_id: 10,
            username: "ana".to_string(),
            role: Role::Administrative,
            cost_center_id: 1,
        }
    }

    fn standard_scope() -> AccessScope {
        AccessScope {
            user_id: 11,
            username: "luis".to_string(),
            role: Role::Standard,
            cost_center_id: 1,
        }
    }

    fn valid_row() -> RowInput {
        RowInput {
            amount: "10.50".to_string(),
            exercise: "2026".to_string(),
            description: "materiales".to_string(),
            rubro: "1".to_string(),
            pda_gral: "01".to_string(),
            pda: "001".to_string(),
            cost_center: CostCenterRef::Name("Tesoreria".to_string()),
            username: "ana".to_string(),
        }
    }

    #[test]
    fn resolves_a_valid_row() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        let movement = resolve_row(MovementKind::Budget, &valid_row(), &ctx).unwrap();
        assert_eq!(movement.cost_center_id, 1);
        assert_eq!(movement.budget_line_id, 100);
        assert_eq!(movement.amount, MoneyCents::new(1050));
        assert_eq!(movement.user_id, 10);
        assert_eq!(movement.exercise, Exercise::Numeric(2026));
    }

    #[test]
    fn cost_center_failure_short_circuits_the_row() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        // Amount is also garbage; only the first failing step is reported.
        let mut row = valid_row();
        row.cost_center = CostCenterRef::Name("Compras".to_string());
        row.amount = "abc".to_string();

        let err = resolve_row(MovementKind::Budget, &row, &ctx).unwrap_err();
        assert_eq!(err, "invalid or unauthorized cost center: 'Compras'");
    }

    #[test]
    fn cost_center_id_reference_must_parse_and_be_permitted() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        let mut row = valid_row();
        row.cost_center = CostCenterRef::Id("2".to_string());
        assert_eq!(
            resolve_row(MovementKind::Budget, &row, &ctx).unwrap().cost_center_id,
            2
        );

        row.cost_center = CostCenterRef::Id("two".to_string());
        let err = resolve_row(MovementKind::Budget, &row, &ctx).unwrap_err();
        assert_eq!(err, "invalid or unauthorized cost center: 'two'");
    }

    #[test]
    fn budget_line_triple_must_match_exactly_one_row() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        let mut row = valid_row();
        row.pda = "999".to_string();
        assert_eq!(
            resolve_row(MovementKind::Budget, &row, &ctx).unwrap_err(),
            "budget line (1, 01, 999) matched 0 rows, expected exactly one"
        );

        let mut row = valid_row();
        row.rubro = "2".to_string();
        row.pda_gral = "05".to_string();
        assert_eq!(
            resolve_row(MovementKind::Budget, &row, &ctx).unwrap_err(),
            "budget line (2, 05, 001) matched 2 rows, expected exactly one"
        );
    }

    #[test]
    fn unknown_username_is_reported_with_its_value() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        let mut row = valid_row();
        row.username = "nadie".to_string();
        assert_eq!(
            resolve_row(MovementKind::Budget, &row, &ctx).unwrap_err(),
            "unknown username: 'nadie'"
        );
    }

    #[test]
    fn batch_collects_all_errors_with_one_based_positions() {
        let (permitted, users, lines) = ctx_fixture();
        let ctx = RowContext {
            permitted: &permitted,
            users: &users,
            budget_lines: &lines,
        };

        let mut bad_amount = valid_row();
        bad_amount.amount = "1.234".to_string();
        let mut bad_user = valid_row();
        bad_user.username = "nadie".to_string();

        let errors =
            resolve_batch(MovementKind::Budget, &[valid_row(), bad_amount, bad_user], &ctx)
                .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "row 2: invalid amount: '1.234'".to_string(),
                "row 3: unknown username: 'nadie'".to_string(),
            ]
        );
    }

    #[test]
    fn precheck_rejects_the_first_foreign_cost_center() {
        let scope = standard_scope();
        let centers = vec![
            crate::CostCenter {
                id: 1,
                name: "Tesoreria".to_string(),
            },
            crate::CostCenter {
                id: 2,
                name: "Obras".to_string(),
            },
        ];
        let permitted = PermittedCostCenters::restrict(&scope, &centers);

        let mut foreign = valid_row();
        foreign.cost_center = CostCenterRef::Name("Obras".to_string());

        let err = precheck_scope(&scope, &permitted, &[valid_row(), foreign]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Forbidden("row 2: cost center 'Obras' is outside your scope".to_string())
        );
    }

    #[test]
    fn precheck_leaves_unparseable_ids_to_row_validation() {
        let scope = standard_scope();
        let centers = vec![crate::CostCenter {
            id: 1,
            name: "Tesoreria".to_string(),
        }];
        let permitted = PermittedCostCenters::restrict(&scope, &centers);

        let mut garbled = valid_row();
        garbled.cost_center = CostCenterRef::Id("x9".to_string());

        assert!(precheck_scope(&scope, &permitted, &[garbled]).is_ok());
    }
}
