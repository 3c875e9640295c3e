//! Session wrapper: OAuth sign in and authenticated Graph requests.
//!
//! A [`GraphSession`] is created once at startup and shared by every request.
//! It holds at most one access token, so it signs in a single user at a time.

use super::{Config, Error, Result};
use reqwest::header::ACCEPT;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use url::Url;
use uuid::Uuid;

/// Refresh tokens this long before the identity provider says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Scope that makes the identity provider issue a refresh token.
const OFFLINE_ACCESS: &str = "offline_access";

/// Most logins that may be in progress at once.
///
/// Starting another login past this drops the oldest one.
pub const MAX_PENDING_LOGINS: usize = 1000;

/// Parameters the identity provider passes to the redirect URI.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RedirectParams {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// The `state` passed to the authorization endpoint.
    pub state: Option<String>,
    /// Error code if sign in failed.
    pub error: Option<String>,
    /// Human readable error message if sign in failed.
    pub error_description: Option<String>,
}

/// An access token and what is needed to renew it.
#[derive(Clone, Debug)]
pub struct Token {
    /// Bearer token for Graph requests.
    pub access_token: String,
    /// Refresh token, if the identity provider issued one.
    pub refresh_token: Option<String>,
    /// When to stop using `access_token`.
    pub expires_at: Option<Instant>,
}

impl Token {
    /// Whether the access token should no longer be used.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// A login waiting for the identity provider to redirect back.
#[derive(Clone, Debug)]
struct PendingLogin {
    /// Where to send the user once they are signed in.
    login_redirect: String,
    /// When the login was started.
    started: Instant,
}

/// A response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// The access token if the request was successful.
    access_token: Option<String>,
    /// The refresh token (requires the `offline_access` scope).
    refresh_token: Option<String>,
    /// Number of seconds until the access token expires.
    expires_in: Option<u64>,
    /// The error code if the request failed.
    error: Option<String>,
    /// The error message if the request failed.
    error_description: Option<String>,
}

/// The body of an error response from Graph.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    /// The error itself.
    error: ApiError,
}

/// An error from Graph.
#[derive(Debug, Deserialize)]
struct ApiError {
    /// Human readable message.
    message: String,
}

/// Signs in a user and makes requests to Graph on their behalf.
#[derive(Debug)]
pub struct GraphSession {
    /// Client credentials and endpoints.
    config: Config,
    /// HTTP client for the identity provider and Graph.
    http_client: reqwest::Client,
    /// The signed in user’s token.
    token: RwLock<Option<Token>>,
    /// Logins in progress by `state`.
    pending: Mutex<HashMap<String, PendingLogin>>,
}

impl GraphSession {
    /// Create a session with nobody signed in.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            token: RwLock::new(None),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Turn a path relative to the API base into a URL.
    ///
    /// Absolute URLs, such as `@odata.nextLink` values, are returned as is.
    ///
    /// ```
    /// use pagination_basics::graph::{Config, GraphSession};
    ///
    /// let session = GraphSession::new(Config::new("id", "secret"));
    /// assert_eq!(
    ///     session.api_endpoint("me/messages"),
    ///     "https://graph.microsoft.com/v1.0/me/messages",
    /// );
    /// assert_eq!(
    ///     session.api_endpoint("https://example.com/x"),
    ///     "https://example.com/x",
    /// );
    /// ```
    #[must_use]
    pub fn api_endpoint(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_owned()
        } else {
            format!(
                "{}/{}",
                self.config.api_base.trim_end_matches('/'),
                path.trim_start_matches('/'),
            )
        }
    }

    /// Start signing in.
    ///
    /// Returns the authorization URL to send the user to. After they sign in,
    /// [`Self::redirect_uri_handler()`] will return `login_redirect`. The
    /// login is forgotten after [`Config::login_timeout`] seconds, or sooner
    /// if more than [`MAX_PENDING_LOGINS`] are started.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authority isn’t a valid URL.
    pub async fn login(
        &self,
        login_redirect: &str,
        log: &slog::Logger,
    ) -> Result<Url> {
        let state = Uuid::new_v4().simple().to_string();
        let mut url = Url::parse(&self.config.authorize_url())?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &self.scope())
            .append_pair("state", &state);

        slog::debug!(log, "Starting login"; "state" => &state);
        let mut pending = self.pending.lock().await;
        self.prune_pending(&mut pending, log);
        if pending.len() >= MAX_PENDING_LOGINS
            && let Some(oldest) = pending
                .iter()
                .min_by_key(|(_, login)| login.started)
                .map(|(state, _)| state.clone())
        {
            slog::debug!(log, "Too many logins in progress; dropping oldest");
            pending.remove(&oldest);
        }
        pending.insert(
            state,
            PendingLogin {
                login_redirect: login_redirect.to_owned(),
                started: Instant::now(),
            },
        );
        Ok(url)
    }

    /// Handle the identity provider redirecting back to us.
    ///
    /// Exchanges the authorization code for a token and returns the
    /// `login_redirect` passed to [`Self::login()`]. Each `state` may only be
    /// used once.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider reported one, if `state` does
    /// not match a login in progress, or if the code exchange fails.
    pub async fn redirect_uri_handler(
        &self,
        params: RedirectParams,
        log: &slog::Logger,
    ) -> Result<String> {
        let login_redirect = {
            let mut pending = self.pending.lock().await;
            self.prune_pending(&mut pending, log);
            params
                .state
                .as_ref()
                .and_then(|state| pending.remove(state))
                .map(|login| login.login_redirect)
        };

        if let Some(error) = params.error {
            slog::warn!(log, "Sign in failed: {error}");
            return Err(Error::OAuth {
                error,
                description: params.error_description,
            });
        }

        let login_redirect = login_redirect.ok_or(Error::UnknownState)?;
        let code = params.code.ok_or(Error::MissingCode)?;

        let token = self
            .request_token(
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("redirect_uri", self.config.redirect_uri.as_str()),
                ],
                log,
                "Code exchange",
            )
            .await?;

        slog::info!(log, "Signed in");
        *self.token.write().await = Some(token);
        Ok(login_redirect)
    }

    /// Send an authenticated GET and return the JSON body as is.
    ///
    /// Exactly one request is made to `endpoint`, after refreshing the access
    /// token if it has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, if `endpoint` is outside the
    /// API base, if the request fails, or if Graph returns an error status.
    pub async fn get(
        &self,
        endpoint: &str,
        log: &slog::Logger,
    ) -> Result<serde_json::Value> {
        let url = self.api_endpoint(endpoint);
        if !self.is_api_url(&url) {
            slog::warn!(log, "Refusing request to foreign endpoint {url}");
            return Err(Error::ForeignEndpoint(url));
        }

        let access_token = self.access_token(log).await?;

        slog::debug!(log, "GET {url}");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    status.canonical_reason().unwrap_or("Unknown").to_owned()
                });
            slog::warn!(log, "GET {url} returned {status}: {message}");
            return Err(Error::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Forget the signed in user.
    pub async fn logout(&self) {
        *self.token.write().await = None;
    }

    /// Whether a user is signed in.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Drop logins that were started too long ago.
    fn prune_pending(
        &self,
        pending: &mut HashMap<String, PendingLogin>,
        log: &slog::Logger,
    ) {
        let timeout = Duration::from_secs(self.config.login_timeout);
        let before = pending.len();
        pending.retain(|_, login| login.started.elapsed() < timeout);
        let dropped = before.saturating_sub(pending.len());
        if dropped > 0 {
            slog::debug!(log, "Dropped {dropped} expired logins");
        }
    }

    /// The requested scopes, space separated, including `offline_access`.
    fn scope(&self) -> String {
        let mut scopes: Vec<&str> =
            self.config.scopes.iter().map(String::as_str).collect();
        if !scopes.contains(&OFFLINE_ACCESS) {
            scopes.push(OFFLINE_ACCESS);
        }
        scopes.join(" ")
    }

    /// Whether `url` is under the configured API base.
    fn is_api_url(&self, url: &str) -> bool {
        let (Ok(base), Ok(url)) =
            (Url::parse(&self.config.api_base), Url::parse(url))
        else {
            return false;
        };

        let base_path = base.path().trim_end_matches('/');
        base.origin() == url.origin()
            && (url.path() == base_path
                || url
                    .path()
                    .strip_prefix(base_path)
                    .is_some_and(|rest| rest.starts_with('/')))
    }

    /// Get a usable access token, refreshing it if necessary.
    async fn access_token(&self, log: &slog::Logger) -> Result<String> {
        let current =
            self.token.read().await.clone().ok_or(Error::NotAuthenticated)?;
        if !current.is_expired() {
            return Ok(current.access_token);
        }

        let refresh_token =
            current.refresh_token.ok_or(Error::NotAuthenticated)?;
        slog::debug!(log, "Access token expired; refreshing");

        let mut token = self
            .request_token(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                ],
                log,
                "Token refresh",
            )
            .await?;

        // Refresh responses may omit the refresh token.
        token.refresh_token = token.refresh_token.or(Some(refresh_token));
        let access_token = token.access_token.clone();
        *self.token.write().await = Some(token);
        Ok(access_token)
    }

    /// Make a request to the token endpoint.
    ///
    /// The client credentials and scope are added to `grant`.
    async fn request_token(
        &self,
        grant: &[(&str, &str)],
        log: &slog::Logger,
        error_context: &str,
    ) -> Result<Token> {
        let scope = self.scope();
        let mut form = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];
        form.extend_from_slice(grant);

        let token_data = self
            .http_client
            .post(self.config.token_url())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .inspect_err(|error| {
                slog::error!(log, "{error_context} request failed: {error}");
            })?
            .json::<TokenResponse>()
            .await
            .inspect_err(|error| {
                slog::error!(
                    log,
                    "Failed to parse {error_context} response: {error}"
                );
            })?;

        if let Some(error) = token_data.error {
            slog::error!(log, "Error in {error_context} response: {error}");
            return Err(Error::OAuth {
                error,
                description: token_data.error_description,
            });
        }

        Ok(Token {
            access_token: token_data
                .access_token
                .ok_or(Error::InvalidTokenResponse)?,
            refresh_token: token_data.refresh_token,
            expires_at: token_data.expires_in.and_then(|seconds| {
                Instant::now().checked_add(
                    Duration::from_secs(seconds).saturating_sub(EXPIRY_MARGIN),
                )
            }),
        })
    }
}
