#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx::postgres::PgConnection;
use sqlx::{Connection, Executor};
use usage_db::Db;

pub const DATABASE_URL_ENV: &str = "USAGE_TEST_DATABASE_URL";

static NEXT_SCHEMA: AtomicUsize = AtomicUsize::new(0);

/// A ledger in a throwaway schema; dropped by [`TestDb::cleanup`].
pub struct TestDb {
    pub db: Db,
    pub schema: String,
    url: String,
}

/// Returns `None` when no test database is configured.
pub async fn setup_db() -> Option<TestDb> {
    let url = std::env::var(DATABASE_URL_ENV).ok()?;
    let schema = format!(
        "usage_test_{}_{}",
        std::process::id(),
        NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
    );
    let conn = PgConnection::connect(&url).await.expect("connect");
    let db = Db::from_connection(conn, &schema).expect("db");
    Some(TestDb { db, schema, url })
}

pub async fn raw_connection(test_db: &TestDb) -> PgConnection {
    PgConnection::connect(&test_db.url).await.expect("connect")
}

impl TestDb {
    pub async fn cleanup(self) {
        let mut conn = PgConnection::connect(&self.url).await.expect("connect");
        conn.execute(format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", self.schema).as_str())
            .await
            .expect("drop schema");
        self.db.close().await.expect("close");
    }
}

pub async fn timescale_available(test_db: &TestDb) -> bool {
    let mut conn = raw_connection(test_db).await;
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'timescaledb')",
    )
    .fetch_one(&mut conn)
    .await
    .expect("check extension")
}

/// Runs each statement on its own; continuous aggregates cannot be created
/// inside a multi-statement batch.
pub async fn execute_each(conn: &mut PgConnection, statements: &[String]) {
    for statement in statements {
        conn.execute(statement.as_str())
            .await
            .unwrap_or_else(|err| panic!("{statement}: {err}"));
    }
}
