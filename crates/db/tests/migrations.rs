mod support;

use chrono::Utc;
use sqlx::Executor;
use support::{raw_connection, setup_db};

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let Some(mut test_db) = setup_db().await else {
        return;
    };
    let db = &mut test_db.db;
    db.ensure_schema().await.expect("first");
    db.upsert_usage("temp", 42, 1.5, Utc::now())
        .await
        .expect("upsert");
    db.ensure_schema().await.expect("second");

    let rows = db.list_usage().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].size_bytes, 42);

    test_db.cleanup().await;
}

#[tokio::test]
async fn ensure_schema_adds_growth_column_to_legacy_ledger() {
    let Some(mut test_db) = setup_db().await else {
        return;
    };
    {
        let mut conn = raw_connection(&test_db).await;
        conn.execute(format!("CREATE SCHEMA \"{}\"", test_db.schema).as_str())
            .await
            .expect("create schema");
        conn.execute(
            format!(
                "CREATE TABLE \"{}\".usage (\"table\" varchar(63) PRIMARY KEY, bytes bigserial, updated_at timestamptz)",
                test_db.schema
            )
            .as_str(),
        )
        .await
        .expect("create legacy table");
        conn.execute(
            format!(
                "INSERT INTO \"{}\".usage (\"table\", bytes, updated_at) VALUES ('legacy', 7, now())",
                test_db.schema
            )
            .as_str(),
        )
        .await
        .expect("insert legacy row");
    }

    let db = &mut test_db.db;
    db.ensure_schema().await.expect("migrate legacy");
    db.upsert_usage("temp", 10, 2.0, Utc::now())
        .await
        .expect("upsert");

    let rows = db.list_usage().await.expect("list");
    assert_eq!(rows.len(), 2);
    let legacy = rows.iter().find(|row| row.name == "legacy").expect("legacy");
    assert_eq!(legacy.size_bytes, 7);
    assert_eq!(legacy.bytes_per_day, 0.0);
    let temp = rows.iter().find(|row| row.name == "temp").expect("temp");
    assert_eq!(temp.bytes_per_day, 2.0);

    test_db.cleanup().await;
}
