pub mod app;
pub mod config;
pub mod error;

pub use app::{connect, ledger_json, load_ledger, run};
pub use config::Config;
pub use error::{AppError, Result};
