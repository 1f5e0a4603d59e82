//! Core error types for focusroom-core.
//!
//! The timer engine itself never fails; everything here belongs to the
//! storage, configuration and recording paths around it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session recording errors
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Why a session record could not be persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnavailableCause {
    /// No authenticated subject to own the record.
    #[error("no authenticated owner")]
    NoOwner,

    /// The backing store rejected the write or could not be reached.
    #[error("store unreachable: {0}")]
    Store(String),
}

/// Session recorder errors.
///
/// Recording has exactly one failure mode from the timer's point of view:
/// the record is dropped and not retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("Persistence unavailable: {cause}")]
    PersistenceUnavailable { cause: UnavailableCause },
}

impl RecorderError {
    pub fn no_owner() -> Self {
        RecorderError::PersistenceUnavailable {
            cause: UnavailableCause::NoOwner,
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        RecorderError::PersistenceUnavailable {
            cause: UnavailableCause::Store(message.into()),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<DatabaseError> for RecorderError {
    fn from(err: DatabaseError) -> Self {
        RecorderError::store(err.to_string())
    }
}

impl From<reqwest::Error> for RecorderError {
    fn from(err: reqwest::Error) -> Self {
        RecorderError::store(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
