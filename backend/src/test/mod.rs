//! Test helpers for both unit and integration tests

use crate::api::{mock::MockAppState, mock::MockApiImpl, pagination_api_mod};
use dropshot::{ConfigDropshot, HttpServer, HttpServerStarter};

/// A logger that throws everything away.
#[must_use]
pub fn discard_log() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

/// A server running the mock API on an ephemeral port.
pub struct TestServer {
    /// The running server.
    server: HttpServer<MockAppState>,
    /// Client that does not follow redirects.
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server with `state` as its context.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if the server can’t be started.
    #[must_use]
    pub fn start(state: MockAppState) -> Self {
        let config = ConfigDropshot {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            ..ConfigDropshot::default()
        };
        let api = pagination_api_mod::api_description::<MockApiImpl>().unwrap();
        let server = HttpServerStarter::new(&config, api, state, &discard_log())
            .unwrap()
            .start();
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { server, client }
    }

    /// The mock state the server was started with.
    #[must_use]
    pub fn state(&self) -> &MockAppState {
        self.server.app_private()
    }

    /// Get an absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.server.local_addr())
    }

    /// Send a GET request to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to complete.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// Shut the server down.
    ///
    /// # Panics
    ///
    /// Panics if the server reports an error.
    pub async fn close(self) {
        self.server.close().await.unwrap();
    }
}

/// Get the `Location` header of a response.
///
/// # Panics
///
/// Panics if there is no valid `Location` header.
#[must_use]
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}
