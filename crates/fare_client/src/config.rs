use std::{collections::HashMap, path::Path, time::Duration};

use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://taxifare.lewagon.ai/predict";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_FILE: &str = "fare.toml";
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),
    #[error("invalid prediction endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("prediction endpoint must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    endpoint: String,
    request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub endpoint: Url,
    /// `None` waits for the endpoint indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl ClientSettings {
    /// Command line overrides win over file and environment values.
    pub fn with_overrides(
        mut self,
        endpoint: Option<&str>,
        request_timeout_secs: Option<u64>,
    ) -> Result<Self, SettingsError> {
        if let Some(endpoint) = endpoint {
            self.endpoint = parse_endpoint(endpoint)?;
        }
        if let Some(secs) = request_timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
        Ok(self)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            endpoint: parse_endpoint(&raw.endpoint)?,
            request_timeout: timeout_from_secs(raw.request_timeout_secs),
        })
    }
}

/// Defaults, then `fare.toml` (or `config_path`), then `APP__*` variables.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_settings_with_env(config_path, None)
}

fn load_settings_with_env(
    config_path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<ClientSettings, SettingsError> {
    let file = match config_path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let raw: RawSettings = Config::builder()
        .set_default("endpoint", DEFAULT_ENDPOINT)?
        .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    ClientSettings::from_raw(raw)
}

fn parse_endpoint(raw: &str) -> Result<Url, SettingsError> {
    let raw = raw.trim();
    let endpoint = Url::parse(raw).map_err(|source| SettingsError::InvalidEndpoint {
        endpoint: raw.to_string(),
        source,
    })?;
    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        other => Err(SettingsError::UnsupportedScheme(other.to_string())),
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
