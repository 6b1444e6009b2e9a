use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use usage_core::MonitoredEntity;
use usage_db::UsageStore;

use crate::discover::{discover_base, discover_derived};
use crate::measure::measure_entity;
use crate::types::{CollectError, IssueStage, Phase, PhaseStats, Result, RunIssue, RunReport};

/// Runs one collection pass: bootstrap the ledger, measure every hypertable and
/// continuous aggregate in `source_schema`, then drop ledger rows for entities
/// that no longer exist.
///
/// Per-entity measurement and upsert failures are recorded in the report and
/// the entity's previous ledger row is left untouched. Everything else aborts
/// the run.
pub async fn collect_usage<S>(store: &mut S, source_schema: &str) -> Result<RunReport>
where
    S: UsageStore + ?Sized,
{
    let acquired = store.try_lock_run().await.map_err(CollectError::Lock)?;
    if !acquired {
        error!(phase = %Phase::Failed, "another run holds the usage lock");
        return Err(CollectError::AlreadyRunning);
    }

    let result = run_locked(store, source_schema).await;
    if let Err(err) = &result {
        error!(phase = %Phase::Failed, error = %err, "usage collection failed");
    }
    // The lock also goes away with the session, so a failed unlock is not fatal.
    if let Err(err) = store.unlock_run().await {
        warn!(error = %err, "failed to release usage lock");
    }
    result
}

async fn run_locked<S>(store: &mut S, source_schema: &str) -> Result<RunReport>
where
    S: UsageStore + ?Sized,
{
    let run_start = Instant::now();
    let mut report = RunReport::new(Utc::now());
    debug!(phase = %Phase::Init, source_schema, "starting usage collection");

    store.ensure_schema().await.map_err(CollectError::Schema)?;
    info!(phase = %Phase::SchemaReady, "usage ledger ready");

    let base = discover_base(store, source_schema).await?;
    report.base = upsert_entities(store, &base, &mut report.issues).await;
    info!(
        phase = %Phase::BaseUpserted,
        discovered = report.base.discovered,
        upserted = report.base.upserted,
        failed = report.base.failed,
        "hypertables processed"
    );

    let derived = discover_derived(store, source_schema).await?;
    report.derived = upsert_entities(store, &derived, &mut report.issues).await;
    info!(
        phase = %Phase::DerivedUpserted,
        discovered = report.derived.discovered,
        upserted = report.derived.upserted,
        failed = report.derived.failed,
        "continuous aggregates processed"
    );

    // Entities that failed to measure stay in the keep set so their last good
    // row survives.
    let keep: Vec<String> = base
        .iter()
        .chain(derived.iter())
        .map(|entity| entity.logical_name.clone())
        .collect();
    report.removed = store
        .delete_usage_except(&keep)
        .await
        .map_err(CollectError::Reconcile)?;
    info!(
        phase = %Phase::Reconciled,
        kept = keep.len(),
        removed = report.removed,
        "usage ledger reconciled"
    );

    report.finished_at = Utc::now();
    info!(
        phase = %Phase::Done,
        discovered = report.discovered(),
        upserted = report.upserted(),
        issues = report.issues.len(),
        elapsed_ms = run_start.elapsed().as_millis() as u64,
        "usage collection finished"
    );
    Ok(report)
}

async fn upsert_entities<S>(
    store: &mut S,
    entities: &[MonitoredEntity],
    issues: &mut Vec<RunIssue>,
) -> PhaseStats
where
    S: UsageStore + ?Sized,
{
    let mut stats = PhaseStats {
        discovered: entities.len(),
        ..PhaseStats::default()
    };
    for entity in entities {
        let now = Utc::now();
        let measurement = match measure_entity(store, entity, now).await {
            Ok(measurement) => measurement,
            Err(err) => {
                warn!(entity = %entity.logical_name, kind = %entity.kind, error = %err, "measurement failed");
                stats.failed += 1;
                issues.push(issue(entity, IssueStage::Measure, err.to_string()));
                continue;
            }
        };
        debug!(
            entity = %entity.logical_name,
            physical = %entity.physical_name,
            bytes = measurement.size_bytes,
            bytes_per_day = measurement.bytes_per_day,
            "measured"
        );
        if let Err(err) = store
            .upsert_usage(
                &entity.logical_name,
                measurement.size_bytes,
                measurement.bytes_per_day,
                now,
            )
            .await
        {
            warn!(entity = %entity.logical_name, kind = %entity.kind, error = %err, "upsert failed");
            stats.failed += 1;
            issues.push(issue(entity, IssueStage::Upsert, err.to_string()));
            continue;
        }
        stats.upserted += 1;
    }
    stats
}

fn issue(entity: &MonitoredEntity, stage: IssueStage, message: String) -> RunIssue {
    RunIssue {
        entity: entity.logical_name.clone(),
        kind: entity.kind,
        stage,
        message,
    }
}
