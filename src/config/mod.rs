//! Configuration management for Stencil.
//!
//! Configuration is read from `~/.config/stencil/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::url_kind::{DEFAULT_HUB_PREFIX, DEFAULT_SERVLET_BASE};
use crate::domain::UrlClassifier;
use crate::fetcher::FetcherConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: EndpointsConfig,
    pub fetcher: FetcherConfig,
    pub store: StoreConfig,
}

/// Where link-list pages and documents live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// URLs starting with this prefix are link-list pages
    pub hub_prefix: String,
    /// Document URLs look like `<servlet_base><type>?...`
    pub servlet_base: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            hub_prefix: DEFAULT_HUB_PREFIX.to_string(),
            servlet_base: DEFAULT_SERVLET_BASE.to_string(),
        }
    }
}

impl EndpointsConfig {
    pub fn classifier(&self) -> crate::app::Result<UrlClassifier> {
        UrlClassifier::new(&self.hub_prefix, &self.servlet_base)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
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

    /// Get the default config file path: `~/.config/stencil/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("stencil").join("config.toml"))
    }

    /// Create a default config file with comments.
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
        format!(
            r##"# Stencil Configuration

[endpoints]
# Pages under this prefix list document links (javascript:self.abre('...'))
hub_prefix = "{hub}"

# Documents are served as <servlet_base><type>?<query>; <type> selects the template
servlet_base = "{servlet}"

[fetcher]
# Whole-request timeout in seconds (no timeout when unset)
# timeout_secs = 60

user_agent = "stencil/{version}"

[store]
# Cache database (defaults to the platform data directory)
# path = "/var/lib/stencil/stencil.db"
"##,
            hub = DEFAULT_HUB_PREFIX,
            servlet = DEFAULT_SERVLET_BASE,
            version = env!("CARGO_PKG_VERSION"),
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

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
