use async_trait::async_trait;
use chrono::{DateTime, Utc};
use usage_core::{MonitoredEntity, UsageRecord};

use crate::Db;
use crate::error::Result;
use crate::types::ContinuousAggregate;

/// Database operations a collection run needs.
///
/// [`Db`] is the Postgres implementation; tests drive the pipeline through
/// an in-memory one.
#[async_trait]
pub trait UsageStore: Send {
    async fn try_lock_run(&mut self) -> Result<bool>;

    async fn unlock_run(&mut self) -> Result<()>;

    async fn ensure_schema(&mut self) -> Result<()>;

    async fn list_hypertables(&mut self, source_schema: &str) -> Result<Vec<String>>;

    async fn list_continuous_aggregates(
        &mut self,
        source_schema: &str,
    ) -> Result<Vec<ContinuousAggregate>>;

    async fn hypertable_size(&mut self, entity: &MonitoredEntity) -> Result<i64>;

    async fn earliest_timestamp(
        &mut self,
        entity: &MonitoredEntity,
    ) -> Result<Option<DateTime<Utc>>>;

    async fn upsert_usage(
        &mut self,
        name: &str,
        size_bytes: i64,
        bytes_per_day: f64,
        now: DateTime<Utc>,
    ) -> Result<()>;

    async fn delete_usage_except(&mut self, keep: &[String]) -> Result<u64>;

    async fn list_usage(&mut self) -> Result<Vec<UsageRecord>>;
}

#[async_trait]
impl UsageStore for Db {
    async fn try_lock_run(&mut self) -> Result<bool> {
        Db::try_lock_run(self).await
    }

    async fn unlock_run(&mut self) -> Result<()> {
        Db::unlock_run(self).await
    }

    async fn ensure_schema(&mut self) -> Result<()> {
        Db::ensure_schema(self).await
    }

    async fn list_hypertables(&mut self, source_schema: &str) -> Result<Vec<String>> {
        Db::list_hypertables(self, source_schema).await
    }

    async fn list_continuous_aggregates(
        &mut self,
        source_schema: &str,
    ) -> Result<Vec<ContinuousAggregate>> {
        Db::list_continuous_aggregates(self, source_schema).await
    }

    async fn hypertable_size(&mut self, entity: &MonitoredEntity) -> Result<i64> {
        Db::hypertable_size(self, entity).await
    }

    async fn earliest_timestamp(
        &mut self,
        entity: &MonitoredEntity,
    ) -> Result<Option<DateTime<Utc>>> {
        Db::earliest_timestamp(self, entity).await
    }

    async fn upsert_usage(
        &mut self,
        name: &str,
        size_bytes: i64,
        bytes_per_day: f64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        Db::upsert_usage(self, name, size_bytes, bytes_per_day, now).await
    }

    async fn delete_usage_except(&mut self, keep: &[String]) -> Result<u64> {
        Db::delete_usage_except(self, keep).await
    }

    async fn list_usage(&mut self) -> Result<Vec<UsageRecord>> {
        Db::list_usage(self).await
    }
}
