use crate::data_source::{Schedule, Strategy};
use crate::error::{ForkRankError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const MAX_PAGE_SIZE: u8 = 100;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub github_token: Option<String>,
    pub strategy: Option<Strategy>,
    pub schedule: Option<Schedule>,
    pub web_url: String,
    pub api_url: Option<String>,
    pub page_size: u8,
    pub user_agent: String,
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("strategy", &self.strategy)
            .field("schedule", &self.schedule)
            .field("web_url", &self.web_url)
            .field("api_url", &self.api_url)
            .field("page_size", &self.page_size)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            strategy: None,
            schedule: None,
            web_url: "https://github.com".to_string(),
            api_url: None,
            page_size: MAX_PAGE_SIZE,
            user_agent: concat!("forkrank/", env!("CARGO_PKG_VERSION")).to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_file = config_dir().join("forkrank").join("config.toml");
        match Self::extract(&config_file) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: {e}, using defaults");
                Config::default()
            }
        }
    }

    fn extract(config_file: &Path) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment.merge(Env::prefixed("FORKRANK_")).merge(
            Env::raw()
                .only(&["GITHUB_TOKEN"])
                .map(|_| "github_token".into()),
        );

        figment
            .extract()
            .map_err(|e| ForkRankError::Config(e.to_string()))
    }

    pub fn token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Explicit choice wins, except that the API cannot be used without a token.
    pub fn resolved_strategy(&self) -> Strategy {
        match (self.strategy, self.token()) {
            (Some(Strategy::Scrape), _) | (_, None) => Strategy::Scrape,
            (Some(Strategy::Api), Some(_)) | (None, Some(_)) => Strategy::Api,
        }
    }

    pub fn resolved_schedule(&self) -> Schedule {
        self.schedule
            .unwrap_or_else(|| self.resolved_strategy().default_schedule())
    }

    pub fn page_size(&self) -> u8 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
