mod discovery;
mod error;
mod ledger;
mod lock;
mod metrics;
mod migrations;
mod store;
mod types;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use usage_core::Ident;

pub use error::{DbError, Result};
pub use store::UsageStore;
pub use types::{ContinuousAggregate, TimeColumn};

/// Name of the ledger table inside the usage schema.
pub const LEDGER_TABLE: &str = "usage";

/// A single Postgres session that owns one collection run.
pub struct Db {
    conn: PgConnection,
    usage_schema: Ident,
}

impl Db {
    pub async fn connect(options: &PgConnectOptions, usage_schema: &str) -> Result<Self> {
        let usage_schema = Ident::new(usage_schema)?;
        let conn = PgConnection::connect_with(options).await?;
        Ok(Self { conn, usage_schema })
    }

    pub fn from_connection(conn: PgConnection, usage_schema: &str) -> Result<Self> {
        Ok(Self {
            conn,
            usage_schema: Ident::new(usage_schema)?,
        })
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Quoted `<usage schema>.usage`.
    fn ledger_table(&self) -> String {
        format!("{}.{}", self.usage_schema, LEDGER_TABLE)
    }
}
