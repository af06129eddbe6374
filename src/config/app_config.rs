use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use error_stack::ResultExt;
use thiserror::Error;

/// Environment variables read as `CSV_TO_SHEETS_<KEY>`.
pub const ENV_PREFIX: &str = "CSV_TO_SHEETS";
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "Config";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration")]
    FailedToRead,
    #[error("Failed to deserialize configuration")]
    FailedToDeserialize,
}

#[derive(serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Service-account JSON file.
    pub credentials: Option<PathBuf>,
    pub folder_id: Option<String>,
    pub work_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `$CONFIG_PATH` (default `Config`, any extension the `config`
    /// crate knows), then overlays `CSV_TO_SHEETS_*` variables.
    /// The file is optional.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> error_stack::Result<Self, ConfigError> {
        Self::build(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: &Path, environment: Environment) -> error_stack::Result<Self, ConfigError> {
        let path_str = path.to_string_lossy();

        Config::builder()
            .add_source(File::with_name(&path_str).required(false))
            .add_source(environment)
            .build()
            .change_context(ConfigError::FailedToRead)
            .attach_printable_lazy(|| format!("Path: {}", path.display()))?
            .try_deserialize()
            .change_context(ConfigError::FailedToDeserialize)
    }
}
