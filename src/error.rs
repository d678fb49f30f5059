//! Error types for threshold configuration and coverage collection

use std::path::PathBuf;
use thiserror::Error;

/// Raised while loading the threshold configuration, before any tests run.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to read threshold config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed threshold config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Threshold config must be a JSON object mapping patterns to percentages")]
    NotAnObject,

    #[error("Threshold for '{pattern}' must be a finite number, got {value}")]
    InvalidThreshold { pattern: String, value: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Raised when the coverage report cannot be turned into per-file percentages.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Failed to read coverage report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse coverage report {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Raised when the wrapped test command cannot be started.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No test command given")]
    Empty,

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
