use chrono::{DateTime, Utc};
use usage_core::{Ident, MonitoredEntity};

use crate::Db;
use crate::error::Result;

impl Db {
    /// Total bytes of the hypertable, including chunks, indexes and toast.
    pub async fn hypertable_size(&mut self, entity: &MonitoredEntity) -> Result<i64> {
        let relation = entity.qualified_name()?;
        let size = sqlx::query_scalar::<_, Option<i64>>("SELECT hypertable_size($1::regclass)")
            .bind(relation)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(size.unwrap_or(0))
    }

    /// Oldest value of the primary time column. `None` when the hypertable is
    /// empty or partitioned by an integer column.
    pub async fn earliest_timestamp(
        &mut self,
        entity: &MonitoredEntity,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(column) = self.time_column(entity).await? else {
            return Ok(None);
        };
        if !column.is_timestamp() {
            return Ok(None);
        }
        let column = Ident::new(&column.name)?;
        let relation = entity.qualified_name()?;
        let earliest = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(&format!(
            "SELECT min({column})::timestamptz FROM {relation}"
        ))
        .fetch_one(&mut self.conn)
        .await?;
        Ok(earliest)
    }
}
