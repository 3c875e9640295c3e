//! Graph session configuration.

use super::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default redirect URI for the local development server.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/login/authorized";

/// Default identity provider authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Default Graph API base.
pub const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Default seconds to wait for the identity provider to redirect back.
pub const DEFAULT_LOGIN_TIMEOUT: u64 = 600;

/// Default scopes: read the profile and the mailbox.
pub const DEFAULT_SCOPES: [&str; 2] = ["User.Read", "Mail.Read"];

/// Configuration.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application (client) ID.
    #[serde(default)]
    pub client_id: String,

    /// Client secret.
    #[serde(default)]
    pub client_secret: String,

    /// Where the identity provider sends the user after they sign in.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Scopes to request.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Identity provider base URL.
    #[serde(default = "default_authority")]
    pub authority: String,

    /// Graph API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Seconds a login may take before its `state` is forgotten.
    #[serde(default = "default_login_timeout")]
    pub login_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            authority: default_authority(),
            api_base: default_api_base(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a configuration with default endpoints and scopes.
    pub fn new<S: Into<String>>(client_id: S, client_secret: S) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use assert2::assert;
    /// use pagination_basics::graph::Config;
    ///
    /// let config = Config::parse(
    ///     r#"
    ///     client_id = "abc"
    ///     client_secret = "shh"
    ///     scopes = ["User.Read"]
    ///     "#,
    /// )
    /// .unwrap();
    ///
    /// assert!(config.client_id == "abc");
    /// assert!(config.scopes == ["User.Read"]);
    /// assert!(config.redirect_uri.ends_with("/login/authorized"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if it can’t parse the configuration.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can’t be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Check that the values without defaults were set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Missing`] naming the first missing value.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Missing("client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::Missing("client_secret"));
        }
        if self.scopes.is_empty() {
            return Err(Error::Missing("scopes"));
        }
        Ok(())
    }

    /// The authorization endpoint.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        let authority = self.authority.trim_end_matches('/');
        format!("{authority}/oauth2/v2.0/authorize")
    }

    /// The token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        let authority = self.authority.trim_end_matches('/');
        format!("{authority}/oauth2/v2.0/token")
    }
}

/// Serde default for [`Config::redirect_uri`].
fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_owned()
}

/// Serde default for [`Config::scopes`].
fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|&scope| scope.to_owned()).collect()
}

/// Serde default for [`Config::authority`].
fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_owned()
}

/// Serde default for [`Config::api_base`].
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_owned()
}

/// Serde default for [`Config::login_timeout`].
const fn default_login_timeout() -> u64 {
    DEFAULT_LOGIN_TIMEOUT
}
