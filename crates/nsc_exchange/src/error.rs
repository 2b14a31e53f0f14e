//! Error types for the exchange orchestrator

use std::io;
use thiserror::Error;

/// Exchange error type
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] nsc_engine::ConfigError),

    #[error("configuration file error: {0}")]
    ConfigFile(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("journal error: {0}")]
    Journal(#[from] csv::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unsupported transfer protocol '{0}'")]
    UnsupportedProtocol(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ExchangeError>;
