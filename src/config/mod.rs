//! Configuration management for blogwatch.
//!
//! Configuration is read from `~/.config/blogwatch/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::fetcher::FetchConfig;
use crate::monitor::batch::DEFAULT_WORKERS;
use crate::normalizer::HtmlConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub html: HtmlConfig,
    pub monitor: MonitorConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Blogs checked concurrently during a run (default: 4)
    pub workers: usize,

    /// SQLite database (default: `<data dir>/blogwatch/blogwatch.db`)
    pub database: Option<PathBuf>,

    /// Snapshot directory (default: `<data dir>/blogwatch/snapshots`)
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            database: None,
            snapshot_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Sender address. Notifications are skipped when unset.
    pub from: Option<String>,

    /// Spool directory (default: `<data dir>/blogwatch/outbox`)
    pub outbox_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/blogwatch/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("blogwatch").join("config.toml"))
    }

    /// Root for the database, snapshots and outbox unless overridden.
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("blogwatch"))
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.monitor.database {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("blogwatch.db")),
        }
    }

    pub fn snapshot_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.monitor.snapshot_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("snapshots")),
        }
    }

    pub fn outbox_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.notify.outbox_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("outbox")),
        }
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# blogwatch configuration

[fetch]
# Request timeout in seconds
timeout_secs = 15

user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"

# Skip TLS certificate verification for every blog. This allows anyone on
# the network path to tamper with fetched content. Prefer the per-blog
# `blogwatch add --insecure-tls` flag for the few hosts that need it.
accept_invalid_certs = false

# Feed entries kept per blog
max_posts = 10

[html]
# Used only when none of the feed locations answers with entries.
remove_selectors = ["script", "style", "nav", "footer", "aside"]

# Tried in order; the first selector that matches anything is used.
post_selectors = [
    "article",
    ".post",
    ".entry",
    ".blog-post",
    "[class*=\"post\"]",
    "main article",
    ".content article",
]

title_selector = "h1, h2, h3, .title, .post-title"

# Characters of block text kept before "..." is appended
content_limit = 500

max_posts = 10

[monitor]
# Blogs checked at the same time
workers = 4

# database = "/var/lib/blogwatch/blogwatch.db"
# snapshot_dir = "/var/lib/blogwatch/snapshots"

[notify]
# Messages are only written when a sender is set.
# from = "blogwatch@example.com"
# outbox_dir = "/var/spool/blogwatch"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl From<ConfigError> for crate::app::BlogwatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
