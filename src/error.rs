//! Error types for the companion pipeline.
//!
//! None of these are fatal. Decode and dispatch errors are logged where they
//! happen and the event is dropped; config errors only surface at startup.

use std::path::PathBuf;

use thiserror::Error;

/// A characteristic payload that could not be turned into a reading or token.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("alert payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("heart rate payload is empty")]
    EmptyReading,
}

/// The platform refused (or could not receive) a scheduled notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification presenter is gone")]
    PresenterClosed,

    #[error("category {0} was never registered")]
    UnknownCategory(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config validation failed: {0}")]
    Invalid(String),
}
