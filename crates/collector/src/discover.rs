use usage_core::{EntityKind, MonitoredEntity};
use usage_db::{ContinuousAggregate, UsageStore};

use crate::types::{CollectError, Result};

pub async fn discover_base<S>(store: &mut S, source_schema: &str) -> Result<Vec<MonitoredEntity>>
where
    S: UsageStore + ?Sized,
{
    let tables = store
        .list_hypertables(source_schema)
        .await
        .map_err(|source| CollectError::Discovery {
            kind: EntityKind::Base,
            source,
        })?;
    Ok(tables
        .iter()
        .map(|table| MonitoredEntity::base(source_schema, table))
        .collect())
}

pub async fn discover_derived<S>(
    store: &mut S,
    source_schema: &str,
) -> Result<Vec<MonitoredEntity>>
where
    S: UsageStore + ?Sized,
{
    let aggregates = store
        .list_continuous_aggregates(source_schema)
        .await
        .map_err(|source| CollectError::Discovery {
            kind: EntityKind::Derived,
            source,
        })?;
    Ok(derived_entities(&aggregates))
}

/// Ledger rows for continuous aggregates are keyed by the view name, but the
/// data lives in the materialization hypertable.
pub fn derived_entities(aggregates: &[ContinuousAggregate]) -> Vec<MonitoredEntity> {
    aggregates
        .iter()
        .map(|aggregate| {
            MonitoredEntity::derived(
                &aggregate.view_name,
                &aggregate.materialization_schema,
                &aggregate.materialization_name,
            )
        })
        .collect()
}
