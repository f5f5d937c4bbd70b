//! Bulk-import file parsing.
//!
//! Accepts CSV data, normalizes the header row (case, whitespace, accents),
//! folds the legacy Spanish header names onto the canonical ones, and turns
//! each record into a [`RowInput`] for row validation. Anything wrong with
//! the file itself (missing or duplicate columns, unreadable records) is a
//! [`EngineError::MalformedFile`]; bad cell values are left for the row
//! validator.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::rows::{CostCenterRef, RowInput};
use crate::{EngineError, ResultEngine};

/// Legacy header names mapped to their canonical column. `id_cetro_cto` is a
/// misspelling that shipped in real files and must keep working.
const HEADER_ALIASES: [(&str, &str); 7] = [
    ("saldo", "amount"),
    ("id_ejercicio", "exercise"),
    ("descripcion", "description"),
    ("nombre_centro_costo", "cost_center"),
    ("id_ctro_cto", "cost_center_id"),
    ("id_cetro_cto", "cost_center_id"),
    ("nombre_usuario", "username"),
];

const REQUIRED_COLUMNS: [&str; 7] = [
    "amount",
    "exercise",
    "description",
    "rubro",
    "pda_gral",
    "pda",
    "username",
];

enum CostCenterColumn {
    Name(usize),
    Id(usize),
}

struct Columns {
    amount: usize,
    exercise: usize,
    description: usize,
    rubro: usize,
    pda_gral: usize,
    pda: usize,
    username: usize,
    cost_center: CostCenterColumn,
}

/// Parses an uploaded file into unvalidated rows.
///
/// A file with only a header row parses to an empty batch.
pub(crate) fn parse_rows(data: &[u8]) -> ResultEngine<Vec<RowInput>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data);
    let headers = reader
        .headers()
        .map_err(|err| EngineError::MalformedFile(err.to_string()))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| EngineError::MalformedFile(err.to_string()))?;
        rows.push(row_from_record(&record, &columns));
    }
    Ok(rows)
}

fn resolve_columns(headers: &StringRecord) -> ResultEngine<Columns> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (idx, raw) in headers.iter().enumerate() {
        let mut name = normalize_header(raw);
        if let Some((_, canonical)) = HEADER_ALIASES.iter().find(|(alias, _)| *alias == name) {
            name = (*canonical).to_string();
        }
        if name.is_empty() {
            continue;
        }
        if positions.insert(name.clone(), idx).is_some() {
            return Err(EngineError::MalformedFile(format!(
                "duplicate column: '{name}'"
            )));
        }
    }

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !positions.contains_key(**name))
        .map(ToString::to_string)
        .collect();

    let cost_center = match (
        positions.get("cost_center").copied(),
        positions.get("cost_center_id").copied(),
    ) {
        (Some(_), Some(_)) => {
            return Err(EngineError::MalformedFile(
                "columns cost_center and cost_center_id are mutually exclusive".to_string(),
            ));
        }
        (Some(idx), None) => Some(CostCenterColumn::Name(idx)),
        (None, Some(idx)) => Some(CostCenterColumn::Id(idx)),
        (None, None) => {
            missing.push("cost_center (or cost_center_id)".to_string());
            None
        }
    };

    if !missing.is_empty() {
        return Err(EngineError::MalformedFile(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    // The missing list is empty, so every lookup below succeeds.
    let position = |name: &str| positions.get(name).copied().unwrap_or_default();
    Ok(Columns {
        amount: position("amount"),
        exercise: position("exercise"),
        description: position("description"),
        rubro: position("rubro"),
        pda_gral: position("pda_gral"),
        pda: position("pda"),
        username: position("username"),
        cost_center: cost_center.unwrap_or(CostCenterColumn::Name(0)),
    })
}

fn row_from_record(record: &StringRecord, columns: &Columns) -> RowInput {
    let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
    RowInput {
        amount: field(columns.amount),
        exercise: field(columns.exercise),
        description: field(columns.description),
        rubro: field(columns.rubro),
        pda_gral: field(columns.pda_gral),
        pda: field(columns.pda),
        cost_center: match columns.cost_center {
            CostCenterColumn::Name(idx) => CostCenterRef::Name(field(idx)),
            CostCenterColumn::Id(idx) => CostCenterRef::Id(field(idx)),
        },
        username: field(columns.username),
    }
}

/// Folds a header cell to its canonical form: accents stripped, lowercased,
/// separator runs collapsed to a single underscore.
fn normalize_header(raw: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in raw.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_sep = false;
        } else if !out.is_empty() && !prev_sep {
            out.push('_');
            prev_sep = true;
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_accents_case_and_separators() {
        assert_eq!(normalize_header("Descripción"), "descripcion");
        assert_eq!(normalize_header("  Id Ejercicio "), "id_ejercicio");
        assert_eq!(normalize_header("PDA_GRAL"), "pda_gral");
        assert_eq!(normalize_header("nombre  centro costo"), "nombre_centro_costo");
        assert_eq!(normalize_header("\u{feff}saldo"), "saldo");
    }

    #[test]
    fn spanish_headers_fold_onto_canonical_columns() {
        let data = b"Saldo,Id_Ejercicio,Descripci\xc3\xb3n,rubro,pda_gral,pda,Nombre_Centro_Costo,Nombre_Usuario\n\
                     10.50,2026,materiales,1,01,001,Tesoreria,ana\n";
        let rows = parse_rows(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, "10.50");
        assert_eq!(rows[0].exercise, "2026");
        assert_eq!(rows[0].description, "materiales");
        assert_eq!(
            rows[0].cost_center,
            CostCenterRef::Name("Tesoreria".to_string())
        );
        assert_eq!(rows[0].username, "ana");
    }

    #[test]
    fn misspelled_cost_center_id_header_is_accepted() {
        let correct = b"amount,exercise,description,rubro,pda_gral,pda,id_ctro_cto,username\n\
                        1.00,2026,x,1,01,001,7,ana\n";
        let misspelled = b"amount,exercise,description,rubro,pda_gral,pda,id_cetro_cto,username\n\
                           1.00,2026,x,1,01,001,7,ana\n";
        assert_eq!(parse_rows(correct).unwrap(), parse_rows(misspelled).unwrap());
        assert_eq!(
            parse_rows(correct).unwrap()[0].cost_center,
            CostCenterRef::Id("7".to_string())
        );
    }

    #[test]
    fn both_cost_center_shapes_are_rejected() {
        let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,cost_center_id,username\n";
        assert_eq!(
            parse_rows(data).unwrap_err(),
            EngineError::MalformedFile(
                "columns cost_center and cost_center_id are mutually exclusive".to_string()
            )
        );
    }

    #[test]
    fn missing_columns_are_listed_in_one_error() {
        let data = b"amount,rubro,pda_gral,pda\n";
        assert_eq!(
            parse_rows(data).unwrap_err(),
            EngineError::MalformedFile(
                "missing required column(s): exercise, description, username, \
                 cost_center (or cost_center_id)"
                    .to_string()
            )
        );
    }

    #[test]
    fn duplicate_canonical_columns_are_rejected() {
        let data = b"amount,saldo,exercise,description,rubro,pda_gral,pda,cost_center,username\n";
        assert_eq!(
            parse_rows(data).unwrap_err(),
            EngineError::MalformedFile("duplicate column: 'amount'".to_string())
        );
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let data = b"id,amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                     42,1.00,2026,x,1,01,001,Tesoreria,ana\n";
        let rows = parse_rows(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, "1.00");
    }

    #[test]
    fn header_only_file_parses_to_an_empty_batch() {
        let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n";
        assert!(parse_rows(data).unwrap().is_empty());
    }

    #[test]
    fn values_are_trimmed() {
        let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                     \x20 1.00 , 2026 , x ,1,01,001, Tesoreria ,ana\n";
        let rows = parse_rows(data).unwrap();
        assert_eq!(rows[0].amount, "1.00");
        assert_eq!(
            rows[0].cost_center,
            CostCenterRef::Name("Tesoreria".to_string())
        );
    }
}
