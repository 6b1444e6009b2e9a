#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use usage_core::{MonitoredEntity, UsageRecord};
use usage_db::{ContinuousAggregate, DbError, Result, UsageStore};

pub const SOURCE: &str = "public";
pub const INTERNAL: &str = "_timescaledb_internal";

/// In-memory stand-in for a TimescaleDB database and its usage ledger.
#[derive(Default)]
pub struct MemoryStore {
    pub hypertables: Vec<(String, String)>,
    pub aggregates: Vec<(String, ContinuousAggregate)>,
    /// Keyed by `schema.table` of the physical hypertable.
    pub sizes: HashMap<String, Option<i64>>,
    pub earliest: HashMap<String, DateTime<Utc>>,
    pub ledger: BTreeMap<String, UsageRecord>,
    pub broken_relations: HashSet<String>,
    pub failing_upserts: HashSet<String>,
    pub fail_schema: bool,
    pub fail_discovery: bool,
    pub fail_reconcile: bool,
    pub lock_held_elsewhere: bool,
    pub locked: bool,
    pub schema_ready: bool,
    pub measured: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hypertable(&mut self, name: &str, size: i64, earliest: Option<DateTime<Utc>>) {
        self.hypertables.push((SOURCE.to_string(), name.to_string()));
        self.set_relation(SOURCE, name, Some(size), earliest);
    }

    pub fn add_aggregate(
        &mut self,
        view: &str,
        materialization: &str,
        size: i64,
        earliest: Option<DateTime<Utc>>,
    ) {
        self.aggregates.push((
            SOURCE.to_string(),
            ContinuousAggregate {
                view_name: view.to_string(),
                materialization_schema: INTERNAL.to_string(),
                materialization_name: materialization.to_string(),
            },
        ));
        self.set_relation(INTERNAL, materialization, Some(size), earliest);
    }

    pub fn set_relation(
        &mut self,
        schema: &str,
        table: &str,
        size: Option<i64>,
        earliest: Option<DateTime<Utc>>,
    ) {
        let key = relation_key(schema, table);
        self.sizes.insert(key.clone(), size);
        match earliest {
            Some(ts) => {
                self.earliest.insert(key, ts);
            }
            None => {
                self.earliest.remove(&key);
            }
        }
    }

    pub fn drop_hypertable(&mut self, name: &str) {
        self.hypertables.retain(|(_, table)| table != name);
        self.sizes.remove(&relation_key(SOURCE, name));
    }

    pub fn seed_row(&mut self, name: &str, size_bytes: i64, updated_at: DateTime<Utc>) {
        self.ledger.insert(
            name.to_string(),
            UsageRecord {
                name: name.to_string(),
                size_bytes,
                bytes_per_day: 0.0,
                updated_at,
            },
        );
    }

    pub fn ledger_names(&self) -> Vec<String> {
        self.ledger.keys().cloned().collect()
    }

    fn relation(&self, entity: &MonitoredEntity) -> Result<String> {
        let key = relation_key(&entity.namespace, &entity.physical_name);
        if self.broken_relations.contains(&key) || !self.sizes.contains_key(&key) {
            return Err(failure(&format!("relation {key} does not exist")));
        }
        Ok(key)
    }
}

pub fn relation_key(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

fn failure(message: &str) -> DbError {
    DbError::Sqlx(sqlx::Error::Protocol(message.to_string()))
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn try_lock_run(&mut self) -> Result<bool> {
        if self.lock_held_elsewhere || self.locked {
            return Ok(false);
        }
        self.locked = true;
        Ok(true)
    }

    async fn unlock_run(&mut self) -> Result<()> {
        self.locked = false;
        Ok(())
    }

    async fn ensure_schema(&mut self) -> Result<()> {
        if self.fail_schema {
            return Err(failure("permission denied for database"));
        }
        self.schema_ready = true;
        Ok(())
    }

    async fn list_hypertables(&mut self, source_schema: &str) -> Result<Vec<String>> {
        if self.fail_discovery {
            return Err(failure("timescaledb_information unavailable"));
        }
        Ok(self
            .hypertables
            .iter()
            .filter(|(schema, _)| schema == source_schema)
            .map(|(_, table)| table.clone())
            .collect())
    }

    async fn list_continuous_aggregates(
        &mut self,
        source_schema: &str,
    ) -> Result<Vec<ContinuousAggregate>> {
        if self.fail_discovery {
            return Err(failure("timescaledb_information unavailable"));
        }
        Ok(self
            .aggregates
            .iter()
            .filter(|(schema, _)| schema == source_schema)
            .map(|(_, aggregate)| aggregate.clone())
            .collect())
    }

    async fn hypertable_size(&mut self, entity: &MonitoredEntity) -> Result<i64> {
        let key = self.relation(entity)?;
        self.measured.push(key.clone());
        Ok(self.sizes.get(&key).copied().flatten().unwrap_or(0))
    }

    async fn earliest_timestamp(
        &mut self,
        entity: &MonitoredEntity,
    ) -> Result<Option<DateTime<Utc>>> {
        let key = self.relation(entity)?;
        Ok(self.earliest.get(&key).copied())
    }

    async fn upsert_usage(
        &mut self,
        name: &str,
        size_bytes: i64,
        bytes_per_day: f64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        assert!(self.schema_ready, "upsert before bootstrap");
        if self.failing_upserts.contains(name) {
            return Err(failure("could not extend file"));
        }
        self.ledger.insert(
            name.to_string(),
            UsageRecord {
                name: name.to_string(),
                size_bytes,
                bytes_per_day,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn delete_usage_except(&mut self, keep: &[String]) -> Result<u64> {
        if self.fail_reconcile {
            return Err(failure("connection reset"));
        }
        let before = self.ledger.len();
        self.ledger.retain(|name, _| keep.contains(name));
        Ok((before - self.ledger.len()) as u64)
    }

    async fn list_usage(&mut self) -> Result<Vec<UsageRecord>> {
        Ok(self.ledger.values().cloned().collect())
    }
}
