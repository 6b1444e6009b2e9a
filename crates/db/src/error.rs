#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("postgres error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("invalid identifier: {0}")]
    Ident(#[from] usage_core::IdentError),
}

pub type Result<T> = std::result::Result<T, DbError>;
