use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::UserDirs;
use serde::{Deserialize, Serialize};

use crate::error::CentaurusError;

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "centaurus.json";
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub library_root: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// TMDB credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, CentaurusError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(CentaurusError::MissingApiKey);
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub library_root: Utf8PathBuf,
    pub base_url: String,
    pub timeout: Duration,
}

impl ResolvedConfig {
    /// Pairs the settings with a credential; fails before any request is made.
    pub fn tmdb_settings(&self, api_key: Option<String>) -> Result<TmdbSettings, CentaurusError> {
        let api_key = ApiKey::new(api_key.ok_or(CentaurusError::MissingApiKey)?)?;
        Ok(TmdbSettings {
            api_key,
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        })
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CentaurusError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CentaurusError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CentaurusError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CentaurusError> {
        let schema_version = config.schema_version.unwrap_or(SCHEMA_VERSION);
        if schema_version != SCHEMA_VERSION {
            return Err(CentaurusError::ConfigParse(format!(
                "unsupported schema_version {schema_version} (expected {SCHEMA_VERSION})"
            )));
        }
        let library_root = match config.library_root {
            Some(root) if !root.trim().is_empty() => Utf8PathBuf::from(root.trim()),
            _ => default_library_root()?,
        };
        let base_url = config
            .api_base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CentaurusError::ConfigParse(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            library_root,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV).ok()
    }
}

/// The user's Documents folder, else the working directory.
pub fn default_library_root() -> Result<Utf8PathBuf, CentaurusError> {
    let documents = UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|dir| dir.to_path_buf()))
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok());
    if let Some(dir) = documents {
        return Ok(dir);
    }
    let cwd =
        std::env::current_dir().map_err(|err| CentaurusError::Filesystem(err.to_string()))?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| CentaurusError::Filesystem("invalid working directory path".to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_apply() {
        let resolved = ConfigLoader::resolve_config(Config {
            library_root: Some("/srv/media".to_string()),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(resolved.library_root, Utf8PathBuf::from("/srv/media"));
        assert_eq!(resolved.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let err = ConfigLoader::resolve_config(Config {
            schema_version: Some(2),
            library_root: Some("/srv/media".to_string()),
            ..Config::default()
        })
        .unwrap_err();
        assert_matches!(err, CentaurusError::ConfigParse(message) if message.contains("schema_version"));
    }

    #[test]
    fn blank_api_key_fails_fast() {
        let resolved = ConfigLoader::resolve_config(Config {
            library_root: Some("/srv/media".to_string()),
            ..Config::default()
        })
        .unwrap();
        assert_matches!(
            resolved.tmdb_settings(Some("   ".to_string())),
            Err(CentaurusError::MissingApiKey)
        );
        assert_matches!(resolved.tmdb_settings(None), Err(CentaurusError::MissingApiKey));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret-value").unwrap();
        assert!(!format!("{key:?}").contains("secret"));
    }
}
