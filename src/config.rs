use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SubmissionsError;

pub const CONFIG_FILE_NAME: &str = "subs-search.json";
pub const BASE_URL_ENV: &str = "SUBMISSIONS_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Explicit values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolution order for the base URL: `--base-url`, then
    /// `SUBMISSIONS_API_URL`, then the config file, then the default.
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, SubmissionsError> {
        let config = match path {
            Some(path) => Self::read(PathBuf::from(path))?,
            None => match Self::default_path() {
                Some(path) => Self::read(path.into_std_path_buf())?,
                None => Config::default(),
            },
        };
        let env_base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Ok(Self::resolve_config(config, env_base_url, overrides))
    }

    pub fn resolve_config(
        config: Config,
        env_base_url: Option<String>,
        overrides: ConfigOverrides,
    ) -> ResolvedConfig {
        let base_url = overrides
            .base_url
            .or(env_base_url)
            .or(config.base_url)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        ResolvedConfig {
            base_url,
            timeout_secs,
        }
    }

    /// First existing file among `./subs-search.json` and the per-user
    /// config directory.
    pub fn default_path() -> Option<Utf8PathBuf> {
        let local = Utf8PathBuf::from(CONFIG_FILE_NAME);
        if local.as_std_path().exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "submissions-search")
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.config_dir().join("config.json")).ok()
            })
            .filter(|path| path.as_std_path().exists())
    }

    pub fn read(path: PathBuf) -> Result<Config, SubmissionsError> {
        let content =
            fs::read_to_string(&path).map_err(|_| SubmissionsError::ConfigRead(path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SubmissionsError::ConfigParse(err.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_set() {
        let resolved =
            ConfigLoader::resolve_config(Config::default(), None, ConfigOverrides::default());
        assert_eq!(resolved, ResolvedConfig::default());
    }

    #[test]
    fn override_beats_env_beats_file() {
        let file = || Config {
            base_url: Some("http://file:1".to_string()),
            timeout_secs: Some(5),
        };

        let resolved = ConfigLoader::resolve_config(file(), None, ConfigOverrides::default());
        assert_eq!(resolved.base_url, "http://file:1");
        assert_eq!(resolved.timeout_secs, 5);

        let resolved = ConfigLoader::resolve_config(
            file(),
            Some("http://env:2".to_string()),
            ConfigOverrides::default(),
        );
        assert_eq!(resolved.base_url, "http://env:2");

        let resolved = ConfigLoader::resolve_config(
            file(),
            Some("http://env:2".to_string()),
            ConfigOverrides {
                base_url: Some("http://flag:3".to_string()),
            },
        );
        assert_eq!(resolved.base_url, "http://flag:3");
    }

    #[test]
    fn zero_timeout_falls_back() {
        let resolved = ConfigLoader::resolve_config(
            Config {
                base_url: None,
                timeout_secs: Some(0),
            },
            None,
            ConfigOverrides::default(),
        );
        assert_eq!(resolved.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
