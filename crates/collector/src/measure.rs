use chrono::{DateTime, Utc};
use usage_core::{Measurement, MonitoredEntity};
use usage_db::UsageStore;

/// Reads size and earliest timestamp for one entity. Writes nothing.
pub async fn measure_entity<S>(
    store: &mut S,
    entity: &MonitoredEntity,
    now: DateTime<Utc>,
) -> usage_db::Result<Measurement>
where
    S: UsageStore + ?Sized,
{
    let size_bytes = store.hypertable_size(entity).await?;
    let earliest = store.earliest_timestamp(entity).await?;
    Ok(Measurement::new(size_bytes, earliest, now))
}
