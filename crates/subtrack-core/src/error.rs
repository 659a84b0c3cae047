//! Error types for subtrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Import error: {0}")]
    Import(String),

    /// Due date is missing or cannot be read as a calendar day
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Subscription is outside its grace window and cannot be marked paid yet
    #[error("Not payable yet: due in {days_until_due} days (window is {grace_days} days)")]
    NotYetPayable { days_until_due: i64, grace_days: i64 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
