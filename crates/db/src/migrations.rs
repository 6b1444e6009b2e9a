use tracing::debug;

use crate::Db;
use crate::error::Result;

impl Db {
    /// Creates the usage schema and ledger table when missing.
    pub async fn ensure_schema(&mut self) -> Result<()> {
        let schema = self.usage_schema.quoted();
        let table = self.ledger_table();
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
            .execute(&mut self.conn)
            .await?;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
              "table" TEXT PRIMARY KEY,
              bytes BIGINT,
              updated_at TIMESTAMPTZ,
              bytes_per_day DOUBLE PRECISION
            )
            "#
        ))
        .execute(&mut self.conn)
        .await?;
        ensure_bytes_per_day_column(self, &table).await?;
        debug!(table = %table, "usage ledger ready");
        Ok(())
    }
}

// Ledgers created before growth tracking only have "table", bytes and updated_at.
async fn ensure_bytes_per_day_column(db: &mut Db, table: &str) -> Result<()> {
    sqlx::query(&format!(
        "ALTER TABLE {table} ADD COLUMN IF NOT EXISTS bytes_per_day DOUBLE PRECISION"
    ))
    .execute(&mut db.conn)
    .await?;
    Ok(())
}
