// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::TruncatedRecord;
use crate::router::HandlerFailure;
use crate::types::WatchId;

#[derive(Error, Debug)]
pub enum InwatchError {
    /// The notification channel could not be opened. Nothing else in the
    /// engine can work without it.
    #[error("failed to open notification channel: {0}")]
    ChannelInit(#[source] std::io::Error),

    #[error("failed to register watch on {path:?}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove watch {id}: {source}")]
    WatchRemoval {
        id: WatchId,
        #[source]
        source: std::io::Error,
    },

    /// The readiness wait failed for a reason other than a timeout or an
    /// interrupting signal.
    #[error("waiting for channel readiness failed: {0}")]
    ReadinessWait(#[source] std::io::Error),

    #[error("querying pending byte count failed: {0}")]
    PendingBytes(#[source] std::io::Error),

    #[error("reading from notification channel failed: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    TruncatedRecord(#[from] TruncatedRecord),

    #[error("unknown watch id {0}")]
    UnknownWatch(WatchId),

    #[error("subscription mask filter must not be empty")]
    EmptyMaskFilter,

    #[error(transparent)]
    HandlerFailure(#[from] HandlerFailure),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, InwatchError>;
