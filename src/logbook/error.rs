use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogbookError {
    #[error("{collection} file is corrupt (line {line}, column {column}): {reason}")]
    Decode {
        collection: &'static str,
        reason: String,
        line: usize,
        column: usize,
    },

    /// The file parsed, but its records break a collection rule.
    #[error("{collection} file is invalid (record {record}): {reason}")]
    InvalidFile {
        collection: &'static str,
        record: usize,
        reason: String,
    },

    #[error("A {collection} record with key {key} already exists")]
    DuplicateIdentity {
        collection: &'static str,
        key: String,
    },

    #[error("No {collection} record with key {key}")]
    NotFound {
        collection: &'static str,
        key: String,
    },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Cancelled")]
    Cancelled,

    #[error("Could not create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl LogbookError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LogbookError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Errors the command loop reports and then keeps running after.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LogbookError::DuplicateIdentity { .. }
                | LogbookError::NotFound { .. }
                | LogbookError::Validation { .. }
                | LogbookError::Cancelled
        )
    }

    /// Errors that make a collection file unusable as it stands.
    pub fn is_corrupt_file(&self) -> bool {
        matches!(
            self,
            LogbookError::Decode { .. } | LogbookError::InvalidFile { .. }
        )
    }

    /// Errors raised while persisting a collection.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            LogbookError::Write { .. } | LogbookError::Io(_) | LogbookError::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LogbookError>;
