use chrono::{DateTime, Utc};
use usage_core::UsageRecord;

use crate::Db;
use crate::error::Result;

impl Db {
    pub async fn upsert_usage(
        &mut self,
        name: &str,
        size_bytes: i64,
        bytes_per_day: f64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let table = self.ledger_table();
        sqlx::query(&format!(
            r#"
            INSERT INTO {table} ("table", bytes, bytes_per_day, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ("table") DO UPDATE SET
              bytes = EXCLUDED.bytes,
              bytes_per_day = EXCLUDED.bytes_per_day,
              updated_at = EXCLUDED.updated_at
            "#
        ))
        .bind(name)
        .bind(size_bytes)
        .bind(bytes_per_day)
        .bind(now)
        .execute(&mut self.conn)
        .await?;
        Ok(())
    }

    /// Deletes every ledger row whose name is not in `keep`. Returns the number
    /// of rows removed.
    pub async fn delete_usage_except(&mut self, keep: &[String]) -> Result<u64> {
        let table = self.ledger_table();
        let result = sqlx::query(&format!(
            r#"DELETE FROM {table} WHERE NOT ("table" = ANY($1))"#
        ))
        .bind(keep.to_vec())
        .execute(&mut self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_usage(&mut self) -> Result<Vec<UsageRecord>> {
        let table = self.ledger_table();
        let rows = sqlx::query_as::<_, (String, Option<i64>, Option<f64>, Option<DateTime<Utc>>)>(
            &format!(
                r#"
                SELECT "table", bytes, bytes_per_day, updated_at
                FROM {table}
                ORDER BY "table"
                "#
            ),
        )
        .fetch_all(&mut self.conn)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(name, bytes, bytes_per_day, updated_at)| UsageRecord {
                name,
                size_bytes: bytes.unwrap_or(0),
                bytes_per_day: bytes_per_day.unwrap_or(0.0),
                updated_at: updated_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            })
            .collect())
    }
}
