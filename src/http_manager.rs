//! Execution of requests over HTTP.
//!
//! [`HttpManager`] performs exactly one network call per invocation. It
//! serializes the body according to the request's `Content-Type`, enforces the
//! request timeout by cancelling the in-flight call, and turns the outcome
//! into a [`Response`] or a classified [`Error`].

use crate::body::BodyParameters;
use crate::{Error, Request, Response, Result};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Performs HTTP calls for [`Request`]s.
///
/// The manager wraps a pooled `reqwest::Client` and is cheap to clone. Calls
/// are independent: there is no queueing, deduplication or retrying.
///
/// # Examples
///
/// ```no_run
/// use spotify_webapi_core::{endpoints, HttpManager};
///
/// # async fn example() -> Result<(), spotify_webapi_core::Error> {
/// let manager = HttpManager::builder()
///     .user_agent("my-app/1.0")
///     .build()?;
///
/// let request = endpoints::web_api_builder("access-token")
///     .with_path("/v1/me/player/play")
///     .with_body_parameters(serde_json::json!({ "uris": ["spotify:track:4iV5W9uYEdYUVa79Axb7Rh"] }))
///     .with_timeout(5_000)
///     .build();
///
/// let response = manager.put(&request).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpManager {
    inner: Arc<HttpManagerInner>,
}

struct HttpManagerInner {
    http_client: reqwest::Client,
    default_headers: HeaderMap,
}

impl HttpManager {
    /// Creates a manager with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Creates a new `HttpManagerBuilder` for configuring a manager.
    pub fn builder() -> HttpManagerBuilder {
        HttpManagerBuilder::new()
    }

    /// Performs a GET request.
    pub async fn get(&self, request: &Request) -> Result<Response> {
        self.send(Method::GET, request).await
    }

    /// Performs a POST request.
    pub async fn post(&self, request: &Request) -> Result<Response> {
        self.send(Method::POST, request).await
    }

    /// Performs a PUT request.
    pub async fn put(&self, request: &Request) -> Result<Response> {
        self.send(Method::PUT, request).await
    }

    /// Performs a DELETE request.
    pub async fn delete(&self, request: &Request) -> Result<Response> {
        self.send(Method::DELETE, request).await
    }

    /// Performs `request` with the given method.
    ///
    /// Construction problems are reported before anything is sent. When the
    /// request has a non-zero timeout and it elapses first, the call is
    /// cancelled and [`Error::Timeout`] is returned.
    pub async fn send(&self, method: Method, request: &Request) -> Result<Response> {
        request.validate()?;
        let url = request.parsed_url()?;
        let headers = self.headers_for(request);
        let body = request.serialized_body_for(&headers)?;
        let timeout = request.timeout();

        tracing::debug!(
            method = %method,
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            "Executing HTTP request"
        );

        let call = self.execute_request(method.clone(), url, headers, body);

        // Dropping the call future on expiry aborts the in-flight request and
        // releases the timer along with it.
        let result = if timeout.is_zero() {
            call.await
        } else {
            match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        method = %method,
                        path = %request.path(),
                        timeout_ms = timeout.as_millis() as u64,
                        "Request timed out"
                    );
                    return Err(Error::Timeout { timeout });
                }
            }
        };

        if let Err(e) = &result {
            tracing::warn!(
                error = %e,
                method = %method,
                path = %request.path(),
                "Request failed"
            );
        }

        result
    }

    /// Sends one request and reads the whole response.
    async fn execute_request(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<Response> {
        let start_time = Instant::now();

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response.text().await?;
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Received HTTP response"
        );

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_body,
                    "Client error (4xx)"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %raw_body,
                    "Server error"
                );
            }

            return Err(Error::from_response(status, headers, raw_body));
        }

        Ok(Response::new(raw_body, status, headers, latency))
    }

    /// Default headers overlaid with the request's own headers.
    ///
    /// A name set on the request replaces the default entirely. JSON bodies
    /// without a `Content-Type` from either source get `application/json`.
    /// The body is serialized according to the result.
    fn headers_for(&self, request: &Request) -> HeaderMap {
        let mut headers = self.inner.default_headers.clone();
        for name in request.headers().keys() {
            headers.remove(name);
        }
        for (name, value) in request.headers() {
            headers.append(name.clone(), value.clone());
        }

        let is_json_body = matches!(
            request.body_parameters(),
            Some(BodyParameters::Object(_) | BodyParameters::Array(_))
        );
        if is_json_body && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        headers
    }
}

/// Builder for configuring and creating an [`HttpManager`].
///
/// # Examples
///
/// ```no_run
/// use spotify_webapi_core::HttpManager;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), spotify_webapi_core::Error> {
/// let manager = HttpManager::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .default_header("Accept-Language", "sv")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HttpManagerBuilder {
    default_headers: HeaderMap,
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl HttpManagerBuilder {
    /// Creates a new `HttpManagerBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            default_headers: HeaderMap::new(),
            user_agent: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Adds a header sent with every request unless the request sets the
    /// same name itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the `User-Agent` used for every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the timeout for establishing connections.
    ///
    /// This is separate from the per-request timeout; when it fires the
    /// failure is reported as [`Error::Transport`].
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Uses an existing `reqwest::Client` instead of building one.
    ///
    /// `user_agent` and `connect_timeout` are ignored in that case.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the configured `HttpManager`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<HttpManager> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(|e| {
                    Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?
            }
        };

        Ok(HttpManager {
            inner: Arc::new(HttpManagerInner {
                http_client,
                default_headers: self.default_headers,
            }),
        })
    }
}

impl Default for HttpManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
