// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, DeciderSettings, EmaRsiSettings, LlmSettings, Settings};

/// Loads the application settings from the default `config/` directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from an optional `base.toml` file in `config_dir`.
/// 2. Merges settings from an optional environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
///
/// Every setting has a default, so no file is required.
pub fn load_settings_from(config_dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let base = config_dir.join("base");
    let env_specific = config_dir.join(&environment);

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name(&base.to_string_lossy()).required(false))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&env_specific.to_string_lossy()).required(false))
        // 3. Load settings from environment variables (e.g., `APP__LLM__MODEL=...`).
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;
    tracing::debug!(environment, provider = %settings.decider.provider, "Settings loaded.");

    Ok(settings)
}

/// Loads settings from a single TOML file, bypassing the layered sources.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let settings: Settings = toml::from_str(&content).map_err(|source| Error::TomlError {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}
