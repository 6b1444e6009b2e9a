use std::time::Duration;

use collector::RunReport;
use tracing::{info, warn};
use usage_core::UsageRecord;
use usage_db::{Db, UsageStore};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Opens the session a run works on.
pub async fn connect(config: &Config) -> Result<Db> {
    let options = config.connect_options();
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    match tokio::time::timeout(
        timeout,
        Db::connect(&options, &config.postgres_usage_schema),
    )
    .await
    {
        Ok(Ok(db)) => Ok(db),
        Ok(Err(err)) => Err(AppError::Connection(err)),
        Err(_) => Err(AppError::ConnectTimeout(config.connect_timeout_secs)),
    }
}

/// One collection run against the configured database.
pub async fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    info!(
        host = %config.postgres_host,
        port = config.postgres_port,
        db = %config.postgres_db,
        source_schema = %config.postgres_source_schema,
        usage_schema = %config.postgres_usage_schema,
        "collecting timescale usage"
    );
    let mut db = connect(config).await?;
    let result = collector::collect_usage(&mut db, &config.postgres_source_schema).await;
    if let Err(err) = db.close().await {
        warn!(error = %err, "failed to close postgres connection");
    }
    Ok(result?)
}

pub async fn load_ledger(config: &Config) -> Result<Vec<UsageRecord>> {
    config.validate()?;
    let mut db = connect(config).await?;
    let records = UsageStore::list_usage(&mut db).await;
    if let Err(err) = db.close().await {
        warn!(error = %err, "failed to close postgres connection");
    }
    Ok(records?)
}

pub fn ledger_json(records: &[UsageRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
