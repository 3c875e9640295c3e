//! Production implementation of the API.
//!
//! This module contains the concrete implementation of the API traits, backed
//! by a [`GraphSession`].

use super::definition::{ApiBase, PaginationApi};
use crate::graph::{self, GraphSession, RedirectParams};
use crate::pages::Pages;
use std::path::{Path, PathBuf};

/// State data for the API (the Graph session, page templates, and where
/// static files live).
#[derive(Debug)]
pub struct AppState {
    /// The session shared by every request.
    pub session: GraphSession,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Compiled page templates.
    pub pages: Pages,
}

impl ApiBase for AppState {
    async fn check_health(&self) -> String {
        "ok".to_owned()
    }

    fn api_endpoint(&self, path: &str) -> String {
        self.session.api_endpoint(path)
    }

    async fn login(
        &self,
        login_redirect: &str,
        log: &slog::Logger,
    ) -> graph::Result<String> {
        Ok(self.session.login(login_redirect, log).await?.into())
    }

    async fn redirect_uri_handler(
        &self,
        params: RedirectParams,
        log: &slog::Logger,
    ) -> graph::Result<String> {
        self.session.redirect_uri_handler(params, log).await
    }

    async fn get(
        &self,
        endpoint: &str,
        log: &slog::Logger,
    ) -> graph::Result<serde_json::Value> {
        self.session.get(endpoint, log).await
    }

    async fn logout(&self, log: &slog::Logger) {
        self.session.logout().await;
        slog::info!(log, "Signed out");
    }

    fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    fn pages(&self) -> &Pages {
        &self.pages
    }
}

/// Implementation type for the `PaginationApi` trait.
///
/// This is an empty enum that serves as the implementation marker.
/// All the actual logic is in the default trait methods.
pub enum PaginationApiImpl {}

impl PaginationApi for PaginationApiImpl {
    type Context = AppState;
}
