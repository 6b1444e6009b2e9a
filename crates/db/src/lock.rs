use crate::Db;
use crate::error::Result;

impl Db {
    /// Session advisory lock key shared by every run writing this ledger.
    fn lock_key(&self) -> String {
        format!("timescale-usage:{}", self.usage_schema.as_str())
    }

    /// Returns `false` when another session already holds the run lock.
    pub async fn try_lock_run(&mut self) -> Result<bool> {
        let key = self.lock_key();
        let acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock(hashtext($1))")
            .bind(key)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(acquired)
    }

    pub async fn unlock_run(&mut self) -> Result<()> {
        let key = self.lock_key();
        sqlx::query_scalar::<_, bool>("SELECT pg_advisory_unlock(hashtext($1))")
            .bind(key)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(())
    }
}
