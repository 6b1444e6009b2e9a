use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use usage_core::EntityKind;
use usage_db::DbError;

/// Steps of a collection run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    SchemaReady,
    BaseUpserted,
    DerivedUpserted,
    Reconciled,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::SchemaReady => "schema_ready",
            Self::BaseUpserted => "base_upserted",
            Self::DerivedUpserted => "derived_upserted",
            Self::Reconciled => "reconciled",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counts for one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    pub discovered: usize,
    pub upserted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStage {
    Measure,
    Upsert,
}

/// Per-entity failure that did not stop the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunIssue {
    pub entity: String,
    pub kind: EntityKind,
    pub stage: IssueStage,
    pub message: String,
}

/// Summary returned by a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub base: PhaseStats,
    pub derived: PhaseStats,
    pub removed: u64,
    pub issues: Vec<RunIssue>,
}

impl RunReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            base: PhaseStats::default(),
            derived: PhaseStats::default(),
            removed: 0,
            issues: Vec::new(),
        }
    }

    pub fn discovered(&self) -> usize {
        self.base.discovered + self.derived.discovered
    }

    pub fn upserted(&self) -> usize {
        self.base.upserted + self.derived.upserted
    }
}

/// Errors that abort a collection run.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("another run holds the usage lock")]
    AlreadyRunning,
    #[error("acquire run lock: {0}")]
    Lock(#[source] DbError),
    #[error("bootstrap usage schema: {0}")]
    Schema(#[source] DbError),
    #[error("discover {kind}s: {source}")]
    Discovery {
        kind: EntityKind,
        #[source]
        source: DbError,
    },
    #[error("reconcile usage ledger: {0}")]
    Reconcile(#[source] DbError),
}

pub type Result<T> = std::result::Result<T, CollectError>;
