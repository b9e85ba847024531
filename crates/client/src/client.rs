//! HTTP transport for the taskdeck REST API.
//!
//! [`ApiClient`] is the single point of outbound HTTP communication. It
//! attaches the session's bearer token to every request, normalizes
//! responses into JSON values and classifies failures into [`ApiError`].
//! On a 401 it clears the [`SessionStore`] before returning.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::ApiRequest;
use crate::session::SessionStore;

/// HTTP client bound to one API root and one session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// Builds a [`reqwest::Client`] with the configured timeout and JSON
    /// default headers. Fails with [`ApiError::InvalidUrl`] if the base URL
    /// does not parse.
    pub fn new(config: &ClientConfig, session: SessionStore) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Self::with_client(http, &config.base_url, session)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful for
    /// connection pooling or custom TLS settings). The caller's client
    /// supplies its own timeout and default headers.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: SessionStore,
    ) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// API root every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this client reads credentials from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Perform one HTTP exchange and return the parsed JSON body.
    ///
    /// - The bearer token is attached iff the session holds one.
    /// - 2xx returns the body unchanged; an empty body yields `null`.
    /// - 401 clears the session, then returns [`ApiError::Unauthorized`].
    /// - Other non-2xx statuses are classified by [`ApiError::from_response`].
    /// - A missing response (refused, timed out) is [`ApiError::Network`].
    ///
    /// Nothing is retried.
    pub async fn request(&self, req: ApiRequest) -> ApiResult<serde_json::Value> {
        let url = self.url(&req.path)?;

        let mut builder = self.http.request(req.method.clone(), url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %req.method, path = %req.path, error = %e, "API request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        tracing::debug!(
            method = %req.method,
            path = %req.path,
            status = status.as_u16(),
            "API request completed",
        );

        // The session ends on the status line alone; a 401 body that never
        // arrives is read as empty.
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %req.path, "Received 401, clearing session");
            self.session.clear_auth();
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::from_response(status, &body));
        }

        let body = response.bytes().await?;
        if status.is_success() {
            return Self::parse_body(&body);
        }
        Err(ApiError::from_response(status, &body))
    }

    /// Perform a request and decode the body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, req: ApiRequest) -> ApiResult<T> {
        let value = self.request(req).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Perform a request whose body, if any, is not needed.
    pub async fn send_empty(&self, req: ApiRequest) -> ApiResult<()> {
        self.request(req).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Join the API root and a resource path.
    fn url(&self, path: &str) -> ApiResult<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// Parse a successful body. Empty bodies (e.g. 204) become `null`.
    fn parse_body(body: &[u8]) -> ApiResult<serde_json::Value> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(body)?)
    }
}
