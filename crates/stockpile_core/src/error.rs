//! # Pool Error Types
//!
//! Only construction and configuration can fail. Everything the storage does
//! at runtime resolves locally: growth is logged, missing entities are
//! no-ops, empty stock yields `None`.

use thiserror::Error;

/// Errors that can occur while building or configuring a pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The entity factory failed to build a resource.
    #[error("failed to construct entity for resource '{key}': {reason}")]
    Construction {
        /// The resource key that was requested.
        key: String,
        /// Why construction failed.
        reason: String,
    },

    /// Invalid configuration value or file contents.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration '{path}': {reason}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        reason: String,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
