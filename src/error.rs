use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRole {
    Subject,
    Reference,
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRole::Subject => f.write_str("player"),
            PlayerRole::Reference => f.write_str("teammate"),
        }
    }
}

/// Insufficient samples are not errors; only structural problems land here.
#[derive(Debug, Error, PartialEq)]
pub enum RadarError {
    #[error("{role} not found: {name}")]
    NotFound { role: PlayerRole, name: String },

    #[error("dataset missing required column {column}")]
    MissingColumn { column: String },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset missing required column {column} (looked for {aliases})")]
    MissingColumn { column: String, aliases: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: String, message: String },
}
