//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/feedcal/config.toml` by default:
//!
//! ```toml
//! [account]
//! username = "jo@gmail.com"
//! password = "pass::google/jo"
//!
//! [feed]
//! calendar = "Work"
//! max_results = 25
//! ```
//!
//! `password` and `token` accept secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use feedcal_gdata::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};
use crate::secret;

/// Configuration for the feedcal CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Account credentials.
    pub account: AccountSettings,

    /// Which feed to work on.
    pub feed: FeedSettings,

    /// Service endpoints and HTTP settings.
    pub service: ServiceSettings,
}

/// Account credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub username: Option<String>,

    /// Password for credential exchange (supports `pass::` and `env::`).
    pub password: Option<String>,

    /// Delegated token, used instead of the password when set
    /// (supports `pass::` and `env::`).
    pub token: Option<String>,
}

/// Feed selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Explicit feed URL.
    pub url: Option<String>,

    /// Calendar title or id to select after authenticating.
    pub calendar: Option<String>,

    /// Default page size for `list`.
    pub max_results: Option<u32>,
}

/// Service endpoints and HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub feeds_base: String,
    pub login_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Send PUT and DELETE as-is instead of tunnelling them through POST.
    pub native_verbs: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            feeds_base: ClientConfig::DEFAULT_FEEDS_BASE.to_string(),
            login_url: ClientConfig::DEFAULT_LOGIN_URL.to_string(),
            timeout: ClientConfig::DEFAULT_TIMEOUT_SECS,
            native_verbs: false,
        }
    }
}

/// How the CLI authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    Token { username: String, token: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => write!(f, "Password({})", username),
            Self::Token { username, .. } => write!(f, "Token({})", username),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feedcal")
    }

    /// Builds the library client configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_feeds_base(self.service.feeds_base.as_str())
            .with_login_url(self.service.login_url.as_str())
            .with_timeout(Duration::from_secs(self.service.timeout));
        if let Some(ref url) = self.feed.url {
            config = config.with_feed_url(url.as_str());
        }
        if self.service.native_verbs {
            config = config.with_native_verbs();
        }
        config
    }

    /// Resolves the configured credentials; a token wins over a password.
    pub fn credentials(&self) -> CliResult<Credentials> {
        let username = self.account.username.clone().ok_or_else(|| {
            CliError::AuthRequired(format!(
                "no username configured. Add to {}:\n  \
                 [account]\n  \
                 username = \"you@example.com\"\n  \
                 password = \"env::FEEDCAL_PASSWORD\"",
                Self::default_path().display()
            ))
        })?;

        if let Some(ref raw) = self.account.token {
            let token = secret::resolve(raw)?;
            return Ok(Credentials::Token { username, token });
        }
        if let Some(ref raw) = self.account.password {
            let password = secret::resolve(raw)?;
            return Ok(Credentials::Password { username, password });
        }
        Err(CliError::AuthRequired(
            "[account] needs either a password or a token".to_string(),
        ))
    }
}
