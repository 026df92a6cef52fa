//! # Configuration
//!
//! Settings come from `<data dir>/config.json` and can be overridden by
//! `DEALERDESK_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DATA_DIR: &str = ".dealerdesk";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_API_URL: &str = "http://localhost:8080/api";

pub const ENV_API_URL: &str = "DEALERDESK_API_URL";
pub const ENV_API_TOKEN: &str = "DEALERDESK_API_TOKEN";
pub const ENV_USER_UID: &str = "DEALERDESK_USER_UID";
pub const ENV_DATA_DIR: &str = "DEALERDESK_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub user_uid: String,
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Decorate collection labels with report counts.
    pub count_info: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            user_uid: String::new(),
            data_dir: default_data_dir(),
            count_info: true,
        }
    }
}

impl AppConfig {
    /// Load from the config file in the data directory, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = std::env::var_os(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self::from_dir(&data_dir)?
            .with_overrides(|key| std::env::var(key).ok())
            .validated()
    }

    pub fn from_dir(data_dir: &Path) -> Result<Self, ConfigError> {
        let file = data_dir.join(CONFIG_FILE);
        let mut config = if file.exists() {
            let raw = fs::read_to_string(&file).map_err(|source| ConfigError::Read {
                path: file.display().to_string(),
                source,
            })?;
            Self::from_json(&raw).map_err(|source| ConfigError::Parse {
                path: file.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api_token = Some(token).filter(|token| !token.trim().is_empty());
        }
        if let Some(user_uid) = lookup(ENV_USER_UID) {
            self.user_uid = user_uid;
        }
        self
    }

    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| ConfigError::Invalid(format!("API URL `{}`: {e}", self.api_base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "API URL `{}` must use http or https",
                self.api_base_url
            )));
        }

        self.user_uid = self.user_uid.trim().to_string();
        if self.user_uid.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "user id is empty, set `user_uid` in {CONFIG_FILE} or {ENV_USER_UID}"
            )));
        }
        Ok(self)
    }

    pub fn state_db_path(&self) -> PathBuf {
        self.data_dir.join("state.db")
    }
}

fn default_data_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DATA_DIR)
}
