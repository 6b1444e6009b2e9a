use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Postgres truncates identifiers past `NAMEDATALEN - 1` bytes.
pub const MAX_IDENT_LEN: usize = 63;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A hypertable in the source schema.
    Base,
    /// A continuous aggregate, measured through its materialization hypertable.
    Derived,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "hypertable"),
            Self::Derived => write!(f, "continuous aggregate"),
        }
    }
}

/// A table or view whose storage is tracked in the usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredEntity {
    /// Name the ledger row is keyed by.
    pub logical_name: String,
    /// Hypertable that physically holds the rows.
    pub physical_name: String,
    /// Schema of `physical_name`.
    pub namespace: String,
    pub kind: EntityKind,
}

impl MonitoredEntity {
    pub fn base(namespace: &str, table: &str) -> Self {
        Self {
            logical_name: table.to_string(),
            physical_name: table.to_string(),
            namespace: namespace.to_string(),
            kind: EntityKind::Base,
        }
    }

    pub fn derived(view: &str, materialization_schema: &str, materialization: &str) -> Self {
        Self {
            logical_name: view.to_string(),
            physical_name: materialization.to_string(),
            namespace: materialization_schema.to_string(),
            kind: EntityKind::Derived,
        }
    }

    /// Quoted `schema.table` of the physical hypertable.
    pub fn qualified_name(&self) -> Result<String, IdentError> {
        qualified_name(&self.namespace, &self.physical_name)
    }
}

/// One row of the usage ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub name: String,
    pub size_bytes: i64,
    pub bytes_per_day: f64,
    pub updated_at: DateTime<Utc>,
}

/// Storage figures for one entity at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub size_bytes: i64,
    pub bytes_per_day: f64,
    pub earliest: Option<DateTime<Utc>>,
}

impl Measurement {
    pub fn new(size_bytes: i64, earliest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            size_bytes,
            bytes_per_day: bytes_per_day(size_bytes, earliest, now),
            earliest,
        }
    }
}

/// Average growth since the earliest stored row.
///
/// An entity without rows counts as created `now`. Anything that would leave
/// zero or negative elapsed time (including clock skew) yields `0.0`, so the
/// result is always finite.
pub fn bytes_per_day(size_bytes: i64, earliest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let earliest = earliest.unwrap_or(now);
    let elapsed = now.signed_duration_since(earliest);
    let days = elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
    if days <= 0.0 {
        return 0.0;
    }
    size_bytes as f64 / days
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier {0:?} is longer than 63 bytes")]
    TooLong(String),
    #[error("identifier {0:?} contains a NUL byte")]
    Nul(String),
}

/// A Postgres identifier that is safe to splice into SQL once quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn new(value: &str) -> Result<Self, IdentError> {
        if value.is_empty() {
            return Err(IdentError::Empty);
        }
        if value.len() > MAX_IDENT_LEN {
            return Err(IdentError::TooLong(value.to_string()));
        }
        if value.contains('\0') {
            return Err(IdentError::Nul(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form with embedded quotes doubled.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quoted())
    }
}

pub fn qualified_name(schema: &str, table: &str) -> Result<String, IdentError> {
    Ok(format!("{}.{}", Ident::new(schema)?, Ident::new(table)?))
}
