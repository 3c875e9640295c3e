//! API contract definitions.
//!
//! This module contains the trait definitions and type signatures that define
//! the HTTP surface. These are independent of any particular implementation.

use crate::graph::{self, RedirectParams};
use crate::pages::{self, Pages};
use crate::static_files;
use dropshot::{
    Body, HttpError, HttpResponseFound, HttpResponseOk, Path, Query,
    RequestContext, http_response_found,
};
use http::{Response, StatusCode, header};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The Graph endpoint `/login` sends the user to after they sign in.
pub const LOGIN_ENDPOINT: &str = "me/messages";

/// Response from `/api/health`
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Health status (always `"ok"`).
    ///
    /// This indicates that the server is up and nothing more.
    pub status: String,
}

/// Parameters for `/pagination`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PaginationParams {
    /// The Graph endpoint to request, absolute or relative to the API base.
    pub endpoint: String,
}

/// Path parameters for `/static/{path}`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StaticPath {
    /// Path segments under the static directory.
    pub path: Vec<String>,
}

/// Base trait defining the business logic for the API.
///
/// This wraps the Graph session so that tests can substitute a mock.
pub trait ApiBase: Send + Sync {
    /// Check that the server is up.
    fn check_health(&self) -> impl Future<Output = String> + Send;

    /// Turn a path relative to the API base into a URL.
    fn api_endpoint(&self, path: &str) -> String;

    /// Start signing in; returns the URL of the identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization URL can’t be built.
    fn login(
        &self,
        login_redirect: &str,
        log: &slog::Logger,
    ) -> impl Future<Output = graph::Result<String>> + Send;

    /// Finish signing in; returns the path passed to [`Self::login()`].
    ///
    /// # Errors
    ///
    /// Returns an error if sign in failed or the code exchange failed.
    fn redirect_uri_handler(
        &self,
        params: RedirectParams,
        log: &slog::Logger,
    ) -> impl Future<Output = graph::Result<String>> + Send;

    /// Make one authenticated GET request to Graph.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the request fails.
    fn get(
        &self,
        endpoint: &str,
        log: &slog::Logger,
    ) -> impl Future<Output = graph::Result<serde_json::Value>> + Send;

    /// Forget the signed in user.
    fn logout(&self, log: &slog::Logger) -> impl Future<Output = ()> + Send;

    /// Directory served under `/static`.
    fn static_dir(&self) -> &std::path::Path;

    /// Templates for the HTML pages.
    fn pages(&self) -> &Pages;
}

/// API trait with endpoint definitions.
///
/// The page endpoints are unpublished since they return HTML rather than
/// JSON. The default implementations delegate to the `ApiBase` trait.
#[dropshot::api_description]
pub trait PaginationApi {
    /// The context type must implement `ApiBase`.
    type Context: ApiBase;

    /// Handle `/`
    #[endpoint {
        method = GET,
        path = "/",
        unpublished = true,
    }]
    async fn homepage(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<Response<Body>, HttpError> {
        let html = rqctx
            .context()
            .pages()
            .homepage(pages::HOME_TITLE)
            .map_err(|error| render_error(&error, &rqctx.log))?;
        html_response(html)
    }

    /// Handle `/login`
    #[endpoint {
        method = GET,
        path = "/login",
        unpublished = true,
    }]
    async fn login(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseFound, HttpError> {
        let context = rqctx.context();
        let endpoint = context.api_endpoint(LOGIN_ENDPOINT);
        let url = context
            .login(&pages::pagination_link(&endpoint), &rqctx.log)
            .await
            .map_err(|error| http_error(error, &rqctx.log))?;
        http_response_found(url)
    }

    /// Handle `/login/authorized`, the redirect URI
    #[endpoint {
        method = GET,
        path = "/login/authorized",
        unpublished = true,
    }]
    async fn authorized(
        rqctx: RequestContext<Self::Context>,
        query: Query<RedirectParams>,
    ) -> Result<HttpResponseFound, HttpError> {
        let location = rqctx
            .context()
            .redirect_uri_handler(query.into_inner(), &rqctx.log)
            .await
            .map_err(|error| http_error(error, &rqctx.log))?;
        http_response_found(location)
    }

    /// Handle `/pagination`
    #[endpoint {
        method = GET,
        path = "/pagination",
        unpublished = true,
    }]
    async fn pagination(
        rqctx: RequestContext<Self::Context>,
        query: Query<PaginationParams>,
    ) -> Result<Response<Body>, HttpError> {
        let context = rqctx.context();
        let endpoint = query.into_inner().endpoint;
        match context.get(&endpoint, &rqctx.log).await {
            Ok(graphdata) => {
                let html = context
                    .pages()
                    .pagination(&graphdata)
                    .map_err(|error| render_error(&error, &rqctx.log))?;
                html_response(html)
            }
            Err(graph::Error::NotAuthenticated) => {
                slog::info!(rqctx.log, "Not signed in; redirecting to login");
                redirect_response("/login")
            }
            Err(error) => Err(http_error(error, &rqctx.log)),
        }
    }

    /// Handle `/logout`
    #[endpoint {
        method = GET,
        path = "/logout",
        unpublished = true,
    }]
    async fn logout(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseFound, HttpError> {
        rqctx.context().logout(&rqctx.log).await;
        http_response_found("/".to_owned())
    }

    /// Handle `/static/{path}`
    #[endpoint {
        method = GET,
        path = "/static/{path:.*}",
        unpublished = true,
    }]
    async fn static_file(
        rqctx: RequestContext<Self::Context>,
        path: Path<StaticPath>,
    ) -> Result<Response<Body>, HttpError> {
        let segments = path.into_inner().path;
        let (content, content_type) =
            static_files::load(rqctx.context().static_dir(), &segments)
                .await
                .ok_or_else(|| {
                    HttpError::for_not_found(
                        None,
                        format!("No such file: {}", segments.join("/")),
                    )
                })?;

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(content))
            .map_err(|error| HttpError::for_internal_error(error.to_string()))
    }

    /// Handle `/api/health`
    #[endpoint {
        method = GET,
        path = "/api/health",
    }]
    async fn health_check(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseOk<HealthResponse>, HttpError> {
        let status = rqctx.context().check_health().await;
        Ok(HttpResponseOk(HealthResponse { status }))
    }
}

/// Build a `200 OK` HTML response.
///
/// # Errors
///
/// Returns an error if the response can’t be built.
pub fn html_response(html: String) -> Result<Response<Body>, HttpError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(html))
        .map_err(|error| HttpError::for_internal_error(error.to_string()))
}

/// Build a `302 Found` response for endpoints that usually return a page.
///
/// # Errors
///
/// Returns an error if the response can’t be built.
pub fn redirect_response(location: &str) -> Result<Response<Body>, HttpError> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .map_err(|error| HttpError::for_internal_error(error.to_string()))
}

/// Log a template error and convert it to an HTTP error.
fn render_error(
    error: &handlebars::RenderError,
    log: &slog::Logger,
) -> HttpError {
    slog::error!(log, "Failed to render page: {error}");
    HttpError::for_internal_error(error.to_string())
}

/// Log a session error and convert it to an HTTP error.
#[must_use]
pub fn http_error(error: graph::Error, log: &slog::Logger) -> HttpError {
    use graph::Error;

    slog::warn!(log, "{error}");
    let message = error.to_string();
    match error {
        Error::OAuth { .. }
        | Error::UnknownState
        | Error::MissingCode
        | Error::NotAuthenticated
        | Error::ForeignEndpoint(_) => {
            HttpError::for_bad_request(None, message)
        }
        Error::Request(_) | Error::Api { .. } => {
            HttpError::for_unavail(None, message)
        }
        Error::Toml(_)
        | Error::Io(_)
        | Error::Missing(_)
        | Error::Url(_)
        | Error::InvalidTokenResponse => HttpError::for_internal_error(message),
    }
}
