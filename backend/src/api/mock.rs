//! Mock implementation of the API for testing.

use super::definition::{ApiBase, PaginationApi};
use crate::graph::{self, RedirectParams};
use crate::pages::Pages;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Mock state that returns predefined responses and records requests.
#[derive(Debug)]
pub struct MockAppState {
    /// URL returned from `login()`.
    pub login_url: String,
    /// Path returned from `redirect_uri_handler()`.
    pub redirect_target: String,
    /// Error description returned from `redirect_uri_handler()` (if Some).
    pub oauth_error: Option<String>,
    /// Error returned from the next call to `get()` (if Some).
    pub get_error: Mutex<Option<graph::Error>>,
    /// Body returned from `get()`.
    pub graphdata: serde_json::Value,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// The real page templates.
    pub pages: Pages,
    /// Every `login_redirect` passed to `login()`.
    pub login_redirects: Mutex<Vec<String>>,
    /// Every `state` passed to `redirect_uri_handler()`.
    pub redirect_states: Mutex<Vec<Option<String>>>,
    /// Every endpoint passed to `get()`.
    pub get_requests: Mutex<Vec<String>>,
    /// Number of calls to `logout()`.
    pub logouts: Mutex<usize>,
}

impl MockAppState {
    /// Create a mock state with a signed in user.
    ///
    /// # Panics
    ///
    /// Panics if the built-in templates don’t compile.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(static_dir: P) -> Self {
        Self {
            login_url: "https://login.example.com/authorize?state=mock"
                .to_owned(),
            redirect_target: "/pagination?endpoint=me%2Fmessages".to_owned(),
            oauth_error: None,
            get_error: Mutex::new(None),
            graphdata: serde_json::json!({ "value": [] }),
            static_dir: static_dir.into(),
            pages: Pages::new().expect("built-in templates should parse"),
            login_redirects: Mutex::new(Vec::new()),
            redirect_states: Mutex::new(Vec::new()),
            get_requests: Mutex::new(Vec::new()),
            logouts: Mutex::new(0),
        }
    }

    /// Create a mock state where `get()` fails with `error`.
    #[must_use]
    pub fn with_get_error<P: Into<PathBuf>>(
        static_dir: P,
        error: graph::Error,
    ) -> Self {
        Self {
            get_error: Mutex::new(Some(error)),
            ..Self::new(static_dir)
        }
    }
}

impl ApiBase for MockAppState {
    async fn check_health(&self) -> String {
        "ok".to_owned()
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("https://graph.example.com/v1.0/{path}")
    }

    async fn login(
        &self,
        login_redirect: &str,
        _log: &slog::Logger,
    ) -> graph::Result<String> {
        self.login_redirects.lock().await.push(login_redirect.to_owned());
        Ok(self.login_url.clone())
    }

    async fn redirect_uri_handler(
        &self,
        params: RedirectParams,
        _log: &slog::Logger,
    ) -> graph::Result<String> {
        self.redirect_states.lock().await.push(params.state);
        if let Some(description) = &self.oauth_error {
            Err(graph::Error::OAuth {
                error: "access_denied".to_owned(),
                description: Some(description.clone()),
            })
        } else {
            Ok(self.redirect_target.clone())
        }
    }

    async fn get(
        &self,
        endpoint: &str,
        _log: &slog::Logger,
    ) -> graph::Result<serde_json::Value> {
        self.get_requests.lock().await.push(endpoint.to_owned());
        match self.get_error.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(self.graphdata.clone()),
        }
    }

    async fn logout(&self, _log: &slog::Logger) {
        let mut logouts = self.logouts.lock().await;
        *logouts = logouts.saturating_add(1);
    }

    fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    fn pages(&self) -> &Pages {
        &self.pages
    }
}

/// Mock implementation type for the `PaginationApi` trait.
pub enum MockApiImpl {}

impl PaginationApi for MockApiImpl {
    type Context = MockAppState;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::discard_log;
    use assert2::{assert, let_assert};

    #[tokio::test]
    async fn test_mock_get_records_endpoint() {
        let mock_state = MockAppState::new("static");
        let result = mock_state.get("me", &discard_log()).await;
        assert!(result.unwrap() == serde_json::json!({ "value": [] }));
        assert!(*mock_state.get_requests.lock().await == ["me"]);
    }

    #[tokio::test]
    async fn test_mock_get_error_is_returned_once() {
        let mock_state = MockAppState::with_get_error(
            "static",
            graph::Error::NotAuthenticated,
        );
        let log = discard_log();
        let_assert!(
            Err(graph::Error::NotAuthenticated) =
                mock_state.get("me", &log).await
        );
        assert!(mock_state.get("me", &log).await.is_ok());
        assert!(*mock_state.get_requests.lock().await == ["me", "me"]);
    }

    #[tokio::test]
    async fn test_mock_oauth_failure() {
        let mock_state = MockAppState {
            oauth_error: Some("Invalid code".to_owned()),
            ..MockAppState::new("static")
        };
        let result = mock_state
            .redirect_uri_handler(RedirectParams::default(), &discard_log())
            .await;
        let_assert!(Err(error) = result);
        assert!(error.to_string() == "Invalid code");
    }
}
