//! allergex-cli: batch and interactive front end for the engine.

pub mod input;
pub mod output;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File mode requires --path")]
    MissingPath,

    #[error("Type of file path is invalid: {0} (expected an existing .txt file)")]
    InvalidPath(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write results: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
