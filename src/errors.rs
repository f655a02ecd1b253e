//! Typed error hierarchy for the benchmark harness.
//!
//! Only two kinds of failure ever leave the sweep:
//! - `HarnessError`: persistence failures (results table, run logs, manifest)
//! - `ConfigError`: an unusable `planbench.toml`
//!
//! Everything below the sweep level (launch failures, timeouts, odd planner
//! output) is downgraded to a recorded outcome and never surfaces here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sweep or a table operation.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write results table at {path}: {source}")]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read results table at {path}: {source}")]
    StoreReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed results table {path}, line {line}: {message}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to write run log at {path}: {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write sweep manifest at {path}: {source}")]
    ManifestWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from loading or interpreting `planbench.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown planner kind '{0}'. Valid values: mcts, astar")]
    UnknownPlanner(String),

    #[error("Unknown plan extractor '{0}'. Valid values: annotated-count, step-count")]
    UnknownExtractor(String),

    #[error("Invalid problem glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Domain '{0}' is listed more than once")]
    DuplicateDomain(String),

    #[error("Planner '{0}' is configured more than once")]
    DuplicatePlanner(String),

    #[error("Invalid value '{value}' for environment variable {var}: expected whole seconds")]
    InvalidEnv { var: String, value: String },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
