//! Errors encountered by the Graph session.

use std::result;

/// `Result` type for `Error`.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Errors encountered by the Graph session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error encountered parsing the TOML configuration.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// An error reading the configuration file.
    #[error("Could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A required configuration value was not set.
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// A URL in the configuration could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request to the identity provider or Graph failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity provider returned an error.
    #[error("{}", description.as_deref().unwrap_or(error))]
    OAuth {
        /// The error code, e.g. `invalid_grant`.
        error: String,
        /// The human readable description, if any.
        description: Option<String>,
    },

    /// The `state` on the redirect does not match a pending login.
    #[error("Unknown or expired login state")]
    UnknownState,

    /// The redirect did not include an authorization code.
    #[error("No authorization code provided")]
    MissingCode,

    /// The token endpoint answered without an access token.
    #[error("No access token in token response")]
    InvalidTokenResponse,

    /// There is no usable access token.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The endpoint is not under the configured API base.
    #[error("Refusing to send credentials to {0}")]
    ForeignEndpoint(String),

    /// Graph answered with an error status.
    #[error("Graph returned {status}: {message}")]
    Api {
        /// The HTTP status.
        status: reqwest::StatusCode,
        /// Graph’s error message, or the status reason.
        message: String,
    },
}
