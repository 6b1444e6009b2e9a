use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("connect to postgres: {0}")]
    Connection(#[source] usage_db::DbError),
    #[error("connect to postgres: timed out after {0}s")]
    ConnectTimeout(u64),
    #[error(transparent)]
    Collect(#[from] collector::CollectError),
    #[error("db error: {0}")]
    Db(#[from] usage_db::DbError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
