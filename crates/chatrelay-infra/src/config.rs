//! Configuration loader for chatrelay.
//!
//! Resolves `config.toml` (explicit path, then `$CHATRELAY_CONFIG`, then
//! `~/.chatrelay/config.toml`), deserializes it into [`RelayConfig`] and
//! applies environment overrides for secrets and deployment knobs.
//!
//! - A missing file yields [`RelayConfig::default()`].
//! - An explicitly named file that cannot be read or parsed is an error.
//! - A broken file at the default location is logged and ignored.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chatrelay_types::config::RelayConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CHATRELAY_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by `--config` or `$CHATRELAY_CONFIG`.
    Explicit(PathBuf),
    /// `~/.chatrelay/config.toml`.
    Default(PathBuf),
    /// No home directory could be determined.
    None,
}

/// Default location: `~/.chatrelay/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chatrelay").join("config.toml"))
}

/// Pick the config file: `explicit`, then `$CHATRELAY_CONFIG`, then the default.
pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }
    match default_config_path() {
        Some(path) => ConfigSource::Default(path),
        None => ConfigSource::None,
    }
}

/// Load configuration from file and process environment.
pub async fn load_config(explicit: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let config = load_config_file(&resolve_config_path(explicit)).await?;
    let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;
    validate_config(config)
}

/// Reject values the router cannot work with.
///
/// A zero timeout would fail every backend call before it starts.
pub fn validate_config(config: RelayConfig) -> Result<RelayConfig, ConfigError> {
    if config.routing.backend_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            var: "routing.backend_timeout_secs".to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(config)
}

/// Read and parse the file named by `source`.
pub async fn load_config_file(source: &ConfigSource) -> Result<RelayConfig, ConfigError> {
    let (path, explicit) = match source {
        ConfigSource::Explicit(path) => (path, true),
        ConfigSource::Default(path) => (path, false),
        ConfigSource::None => {
            tracing::debug!("no home directory, using default configuration");
            return Ok(RelayConfig::default());
        }
    };

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            if explicit {
                tracing::warn!("config file {} not found, using defaults", path.display());
            } else {
                tracing::debug!("no config.toml at {}, using defaults", path.display());
            }
            return Ok(RelayConfig::default());
        }
        Err(source) if explicit => {
            return Err(ConfigError::Read {
                path: path.clone(),
                source,
            });
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", path.display());
            return Ok(RelayConfig::default());
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => {
            tracing::info!("loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(source) if explicit => Err(ConfigError::Parse {
            path: path.clone(),
            source,
        }),
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", path.display());
            Ok(RelayConfig::default())
        }
    }
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests never mutate process state.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("WHATSAPP_VERIFY_TOKEN") {
        config.whatsapp.verify_token = v;
    }
    if let Some(v) = get("WHATSAPP_TOKEN") {
        config.whatsapp.access_token = v;
    }
    if let Some(v) = get("WHATSAPP_PHONE_NUMBER_ID") {
        config.whatsapp.phone_number_id = v;
    }
    if let Some(v) = get("WHATSAPP_APP_SECRET") {
        config.whatsapp.app_secret = Some(v);
    }
    if let Some(v) = get("GEMINI_API_KEY") {
        config.gemini.api_key = v;
    }
    if let Some(v) = get("GEMINI_MODEL") {
        config.gemini.model = v;
    }
    if let Some(v) = get("OLLAMA_BASE_URL") {
        config.ollama.base_url = v;
    }
    if let Some(v) = get("OLLAMA_MODEL") {
        config.ollama.model = v;
    }
    if let Some(v) = get("CHATRELAY_INPUT_MODE") {
        config.routing.input_mode = v.parse().map_err(|message| ConfigError::InvalidValue {
            var: "CHATRELAY_INPUT_MODE".to_string(),
            message,
        })?;
    }

    Ok(config)
}
