use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenient result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading, parsing, or watching the configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid TOML for our schema.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The filesystem watcher could not be installed.
    #[error("failed to watch config at {path}: {source}")]
    Watch {
        /// Path being watched.
        path: PathBuf,
        /// Underlying notify error.
        source: notify::Error,
    },
}
