//! # Engine Configuration Module
//!
//! Configuration for building an [`Engine`](crate::Engine) at start-up, loaded
//! from an optional TOML file and then overridden from the environment.
//!
//! ## File Format
//!
//! ```toml
//! default_middleware = true
//!
//! [access_log]
//! max_path_len = 30
//!
//! [[statics]]
//! path = "/assets"
//! root = "./public"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.
//!
//! ## Environment Variables
//!
//! ### `CHAINROUTE_DEFAULT_MIDDLEWARE`
//!
//! `true`/`false`: install the access logger and recovery middleware on the
//! root group. Default: `true`
//!
//! ### `CHAINROUTE_ACCESS_LOG_PATH_MAX`
//!
//! Longest request target the access logger prints before truncating it with
//! `...`. Default: `30`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chainroute::config::EngineConfig;
//! use chainroute::Engine;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = EngineConfig::load("chainroute.toml")?;
//! config.apply_env();
//! let engine = Engine::from_config(&config)?;
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Default maximum request target length in access log lines
pub const DEFAULT_MAX_PATH_LEN: usize = 30;

fn default_true() -> bool {
    true
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

/// Access logger settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AccessLogConfig {
    /// Longest request target logged verbatim
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

/// One static directory mount
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StaticMount {
    /// URL prefix, e.g. `/assets`
    pub path: String,
    /// Directory served below the prefix
    pub root: PathBuf,
}

/// Start-up configuration for an [`Engine`](crate::Engine)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Install logger + recovery on the root group
    #[serde(default = "default_true")]
    pub default_middleware: bool,

    #[serde(default)]
    pub access_log: AccessLogConfig,

    /// Static mounts registered on the root group
    #[serde(default)]
    pub statics: Vec<StaticMount>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_middleware: true,
            access_log: AccessLogConfig::default(),
            statics: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse engine config")
    }

    /// Load configuration from a TOML file
    ///
    /// A missing file is not an error and yields the defaults; a file that
    /// exists but cannot be read or parsed is.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse engine config: {}", path.display()))
    }

    /// Override fields from `CHAINROUTE_*` environment variables
    ///
    /// Unparsable values are ignored and the current value is kept.
    pub fn apply_env(&mut self) {
        if let Some(enabled) = env::var("CHAINROUTE_DEFAULT_MIDDLEWARE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.default_middleware = enabled;
        }
        if let Some(max) = env::var("CHAINROUTE_ACCESS_LOG_PATH_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.access_log.max_path_len = max;
        }
    }
}
