// In crates/app-config/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load layered settings: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Failed to read settings file {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    TomlError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value that deserialized fine but cannot drive the tool.
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
