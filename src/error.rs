//! Domain-specific error types for the registry engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`BackupError`]).  Command setup collects them into [`RegtidyError`],
//! and command handlers at the CLI boundary convert that to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! Registry access has its own [`StoreError`](crate::registry::StoreError);
//! scans and mutations absorb it per key or per location rather than
//! aborting, so it only surfaces here when a command needs a hard failure.
//!
//! # Error hierarchy
//!
//! ```text
//! RegtidyError
//! ├── Config(ConfigError)     settings file parsing and validation
//! ├── Store(StoreError)       registry access
//! ├── Backup(BackupError)     .reg export destination failures
//! ├── Platform(PlatformError) running on a host without a registry
//! └── Worker(WorkerError)     background operation failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::Os;
use crate::registry::StoreError;

/// Top-level error type for the registry engine.
#[derive(Error, Debug)]
pub enum RegtidyError {
    /// Configuration-related error (parsing, validation, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Registry access error.
    #[error("Registry error: {0}")]
    Store(#[from] StoreError),

    /// Backup export error.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Platform-specific error.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Background worker error.
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Errors that arise from loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file contains a syntax or type error.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// Path of the settings file.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A setting has a value that cannot be used.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// Name of the offending setting.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An I/O error occurred while reading the settings file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while writing a `.reg` backup.
///
/// Registry read failures never appear here; they are written into the
/// backup as comment lines instead.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The destination file or its directory could not be written.
    #[error("failed to write backup {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The requested operation needs the Windows registry.
    #[error("Operation not supported on {os}: the Windows registry is unavailable")]
    Unsupported {
        /// The detected host OS.
        os: Os,
    },
}

/// Errors that arise from background operations.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The OS refused to start a worker thread.
    #[error("failed to start worker '{name}': {source}")]
    Spawn {
        /// Name of the operation.
        name: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The operation panicked before producing a result.
    #[error("worker '{name}' panicked")]
    Panicked {
        /// Name of the operation.
        name: String,
    },
}
