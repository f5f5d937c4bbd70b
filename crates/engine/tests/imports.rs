use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{AccessScope, Engine, EngineError, MovementKind, Role};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_reference_data(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn seed_reference_data(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    for (id, name) in [(1, "Tesoreria"), (2, "Obras")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO cost_centers (id, name) VALUES (?, ?)",
            vec![id.into(), name.into()],
        ))
        .await
        .unwrap();
    }
    for (id, username, cost_center_id, role) in [
        (1, "ana", 1, "administrative"),
        (2, "luis", 1, "standard"),
        (3, "marta", 2, "standard"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (id, username, password_hash, cost_center_id, role) \
             VALUES (?, ?, ?, ?, ?)",
            vec![
                id.into(),
                username.into(),
                "unused".into(),
                cost_center_id.into(),
                role.into(),
            ],
        ))
        .await
        .unwrap();
    }
    for (id, rubro, pda_gral, pda) in [
        (100, "1", "01", "001"),
        (101, "1", "01", "002"),
        (102, "2", "05", "001"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO budget_lines (id, rubro, pda_gral, pda) VALUES (?, ?, ?, ?)",
            vec![id.into(), rubro.into(), pda_gral.into(), pda.into()],
        ))
        .await
        .unwrap();
    }
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS count FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "count").unwrap()
}

fn admin_scope() -> AccessScope {
    AccessScope {
        user_id: 1,
        username: "ana".to_string(),
        role: Role::Administrative,
        cost_center_id: 1,
    }
}

fn standard_scope() -> AccessScope {
    AccessScope {
        user_id: 2,
        username: "luis".to_string(),
        role: Role::Standard,
        cost_center_id: 1,
    }
}

#[tokio::test]
async fn import_inserts_every_valid_row() {
    let (engine, db) = engine_with_db().await;

    let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                 10.50,2026,materiales,1,01,001,Tesoreria,ana\n\
                 -3.25,2026,ajuste,1,01,002,Obras,marta\n";

    let inserted = engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(count(&db, "movements").await, 2);
    assert_eq!(count(&db, "executions").await, 0);
}

#[tokio::test]
async fn import_accepts_the_legacy_spanish_headers() {
    let (engine, db) = engine_with_db().await;

    let data = "saldo,id_ejercicio,Descripción,rubro,pda_gral,pda,id_ctro_cto,nombre_usuario\n\
                10.50,2026,materiales,1,01,001,1,ana\n"
        .as_bytes();

    let inserted = engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(count(&db, "movements").await, 1);
}

#[tokio::test]
async fn misspelled_id_header_behaves_like_the_correct_one() {
    let (engine, db) = engine_with_db().await;

    let row = "10.50,2026,materiales,1,01,001,1,ana\n";
    let correct = format!(
        "amount,exercise,description,rubro,pda_gral,pda,id_ctro_cto,username\n{row}"
    );
    let misspelled = format!(
        "amount,exercise,description,rubro,pda_gral,pda,id_cetro_cto,username\n{row}"
    );

    engine
        .import_movements(&admin_scope(), MovementKind::Budget, correct.as_bytes())
        .await
        .unwrap();
    engine
        .import_movements(&admin_scope(), MovementKind::Budget, misspelled.as_bytes())
        .await
        .unwrap();
    assert_eq!(count(&db, "movements").await, 2);
}

#[tokio::test]
async fn one_bad_row_rejects_the_whole_file() {
    let (engine, db) = engine_with_db().await;

    let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                 10.50,2026,materiales,1,01,001,Tesoreria,ana\n\
                 oops,2026,ajuste,1,01,002,Tesoreria,ana\n\
                 1.00,2026,libros,9,99,999,Tesoreria,nadie\n";

    let err = engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::BatchRejected(vec![
            "row 2: invalid amount: 'oops'".to_string(),
            "row 3: budget line (9, 99, 999) matched 0 rows, expected exactly one".to_string(),
        ])
    );
    assert_eq!(count(&db, "movements").await, 0);
}

#[tokio::test]
async fn missing_columns_are_reported_in_one_error() {
    let (engine, _db) = engine_with_db().await;

    let data = b"amount,rubro,pda_gral,pda\n1.00,1,01,001\n";
    let err = engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MalformedFile(
            "missing required column(s): exercise, description, username, \
             cost_center (or cost_center_id)"
                .to_string()
        )
    );
}

#[tokio::test]
async fn name_and_id_cost_center_columns_are_mutually_exclusive() {
    let (engine, _db) = engine_with_db().await;

    let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,cost_center_id,username\n\
                 1.00,2026,x,1,01,001,Tesoreria,1,ana\n";
    let err = engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MalformedFile(
            "columns cost_center and cost_center_id are mutually exclusive".to_string()
        )
    );
}

#[tokio::test]
async fn foreign_cost_center_rows_are_rejected_before_validation() {
    let (engine, db) = engine_with_db().await;

    // The second row also has a bad amount; the scope check must win.
    let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                 1.00,2026,x,1,01,001,Tesoreria,luis\n\
                 oops,2026,y,1,01,001,Obras,luis\n";

    let err = engine
        .import_movements(&standard_scope(), MovementKind::Budget, data)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("row 2: cost center 'Obras' is outside your scope".to_string())
    );
    assert_eq!(count(&db, "movements").await, 0);
}

#[tokio::test]
async fn empty_file_and_header_only_file_import_nothing() {
    let (engine, db) = engine_with_db().await;

    let inserted = engine
        .import_movements(&admin_scope(), MovementKind::Budget, b"")
        .await
        .unwrap();
    assert_eq!(inserted, 0);

    let inserted = engine
        .import_movements(
            &admin_scope(),
            MovementKind::Budget,
            b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n",
        )
        .await
        .unwrap();
    assert_eq!(inserted, 0);
    assert_eq!(count(&db, "movements").await, 0);
}

#[tokio::test]
async fn execution_import_requires_dated_exercises() {
    let (engine, db) = engine_with_db().await;

    let dated = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                  5.00,2026-03-14,obra civil,2,05,001,Obras,marta\n";
    let inserted = engine
        .import_movements(&admin_scope(), MovementKind::Execution, dated)
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(count(&db, "executions").await, 1);
    assert_eq!(count(&db, "movements").await, 0);

    let numeric = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                    5.00,2026,obra civil,2,05,001,Obras,marta\n";
    let err = engine
        .import_movements(&admin_scope(), MovementKind::Execution, numeric)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::BatchRejected(vec![
            "row 1: invalid exercise: '2026', expected an ISO date (YYYY-MM-DD)".to_string(),
        ])
    );
}

#[tokio::test]
async fn export_then_reimport_reproduces_the_rows() {
    let (engine, _db) = engine_with_db().await;

    let data = b"amount,exercise,description,rubro,pda_gral,pda,cost_center,username\n\
                 10.50,2026,materiales,1,01,001,Tesoreria,ana\n\
                 -3.25,2027,ajuste,1,01,002,Obras,marta\n";
    engine
        .import_movements(&admin_scope(), MovementKind::Budget, data)
        .await
        .unwrap();

    let exported = engine
        .export_csv(&admin_scope(), MovementKind::Budget)
        .await
        .unwrap();

    let (other, other_db) = engine_with_db().await;
    let inserted = other
        .import_movements(&admin_scope(), MovementKind::Budget, exported.as_bytes())
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(count(&other_db, "movements").await, 2);

    let original = engine
        .report(&admin_scope(), MovementKind::Budget)
        .await
        .unwrap();
    let copied = other
        .report(&admin_scope(), MovementKind::Budget)
        .await
        .unwrap();

    let key = |report: &engine::Report| {
        let mut rows: Vec<_> = report
            .rows
            .iter()
            .map(|row| {
                (
                    row.amount,
                    row.exercise.clone(),
                    row.description.clone(),
                    row.rubro.clone(),
                    row.pda_gral.clone(),
                    row.pda.clone(),
                    row.cost_center.clone(),
                    row.username.clone(),
                )
            })
            .collect();
        rows.sort();
        rows
    };
    assert_eq!(key(&original), key(&copied));
    assert_eq!(original.total, copied.total);
}
