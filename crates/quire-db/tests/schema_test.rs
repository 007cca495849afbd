//! Migration runner tests using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct VersionRow {
    version: u32,
}

#[tokio::test]
async fn migrations_apply_once_and_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    quire_db::run_migrations(&db).await.unwrap();
    quire_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT version FROM _migration").await.unwrap();
    let rows: Vec<VersionRow> = result.take(0).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].version, quire_db::latest_version());
}

#[tokio::test]
async fn status_assert_rejects_unknown_values() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quire_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE page SET tenant_id = '', slug = 'x', title = 'X', \
             status = 'invalid'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
