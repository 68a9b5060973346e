//! Error types for prio
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, nothing at the requested position)
//! - 3: Blocked by a guard (task limit reached, schema newer than this binary)
//! - 4: Operation failed (database, I/O)

use thiserror::Error;

/// Exit codes for the prio CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for prio operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid summary: {0}")]
    InvalidSummary(String),

    #[error("Context is too large ({size} bytes, max {max})")]
    ContextTooLarge { size: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No task at position {0}")]
    NoTaskAtPosition(usize),

    // Guard blocks (exit code 3)
    #[error("Task limit reached ({limit} active tasks)")]
    CapacityExceeded { count: usize, limit: usize },

    #[error("Database schema version {found} is newer than the latest this binary knows ({supported})")]
    SchemaDowngrade { found: i64, supported: i64 },

    // Operation failures (exit code 4)
    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Migration to schema version {version} failed: {source}")]
    Migration {
        version: i64,
        source: rusqlite::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidSummary(_)
            | Error::ContextTooLarge { .. }
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::NoTaskAtPosition(_) => exit_codes::USER_ERROR,

            // Guard blocks
            Error::CapacityExceeded { .. } | Error::SchemaDowngrade { .. } => exit_codes::BLOCKED,

            // Operation failures
            Error::Store(_)
            | Error::Migration { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured payload for JSON error output, where the variant carries one
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::ContextTooLarge { size, max } => Some(serde_json::json!({
                "size_bytes": size,
                "max_bytes": max,
            })),
            Error::NoTaskAtPosition(position) => {
                Some(serde_json::json!({ "position": position }))
            }
            Error::CapacityExceeded { count, limit } => Some(serde_json::json!({
                "active_tasks": count,
                "limit": limit,
            })),
            Error::SchemaDowngrade { found, supported } => Some(serde_json::json!({
                "found_version": found,
                "supported_version": supported,
            })),
            Error::Migration { version, .. } => Some(serde_json::json!({ "version": version })),
            _ => None,
        }
    }
}

/// Result type alias for prio operations
pub type Result<T> = std::result::Result<T, Error>;
