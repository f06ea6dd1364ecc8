//! Request builder and the immutable request descriptor it produces.
//!
//! A [`RequestBuilder`] is created fresh for every call, configured with
//! chained `with_*` methods and turned into a [`Request`] with
//! [`RequestBuilder::build`]. The `Request` is a value snapshot: it can be
//! executed, inspected and cloned without affecting the builder.

use crate::body::BodyParameters;
use crate::query::{IntoQueryParameters, QueryParameters};
use crate::{Error, HttpManager, Response, Result};
use base64::{prelude::BASE64_STANDARD, Engine};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Chainable accumulator for a [`Request`].
///
/// `with_host`, `with_port`, `with_scheme`, `with_path` and `with_timeout`
/// overwrite their field. Query parameters, body parameters and headers
/// accumulate across calls.
///
/// Invalid header names or values are recorded rather than returned, so the
/// chain never breaks; they surface as [`Error::InvalidRequest`] when the
/// request is executed.
///
/// # Examples
///
/// ```
/// use spotify_webapi_core::Request;
/// use serde_json::json;
///
/// let request = Request::builder()
///     .with_scheme("https")
///     .with_host("api.spotify.com")
///     .with_port(443)
///     .with_path("/v1/search")
///     .with_query_parameters(json!({ "q": "daft punk", "type": "artist" }))
///     .with_query_parameters([("limit", Some(5)), ("offset", None)])
///     .with_auth("access-token")
///     .build();
///
/// assert_eq!(
///     request.url().unwrap(),
///     "https://api.spotify.com/v1/search?q=daft%20punk&type=artist&limit=5"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    host: String,
    port: u16,
    scheme: String,
    path: String,
    query_parameters: QueryParameters,
    body_parameters: Option<BodyParameters>,
    headers: HeaderMap,
    timeout: Duration,
    invalid_header: Option<String>,
}

impl RequestBuilder {
    /// Creates an empty builder. Host, port and scheme must be set before the
    /// request can be executed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the timeout in milliseconds. `0` disables the timeout.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Appends query parameters.
    ///
    /// Accepts JSON objects, `(key, value)` pair sequences, pre-encoded query
    /// strings and [`QueryParameters`]. Absent values are skipped.
    pub fn with_query_parameters(mut self, params: impl IntoQueryParameters) -> Self {
        self.query_parameters.extend(params);
        self
    }

    /// Merges body parameters into the current body.
    ///
    /// Objects are merged key by key and arrays are concatenated. A string is
    /// treated as a pre-serialized body and replaces whatever was there.
    /// Passing an empty value (`null`, `""`, `{}` or `[]`) clears the body.
    ///
    /// # Examples
    ///
    /// ```
    /// use spotify_webapi_core::{BodyParameters, Request};
    /// use serde_json::json;
    ///
    /// let request = Request::builder()
    ///     .with_body_parameters(json!({ "uris": ["spotify:track:1"] }))
    ///     .with_body_parameters(json!({ "position": 2 }))
    ///     .build();
    ///
    /// assert_eq!(
    ///     request.body_parameters(),
    ///     BodyParameters::from_value(json!({ "uris": ["spotify:track:1"], "position": 2 })).as_ref()
    /// );
    /// ```
    pub fn with_body_parameters(mut self, params: impl Into<Value>) -> Self {
        self.body_parameters = BodyParameters::merge(self.body_parameters.take(), params.into());
        self
    }

    /// Appends headers.
    ///
    /// Every entry is appended, so repeating a name keeps all of its values.
    /// Pass a `&HeaderMap` to copy an existing map.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: fmt::Display,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: fmt::Display,
    {
        for (name, value) in headers {
            let name = match name.try_into() {
                Ok(name) => name,
                Err(e) => {
                    self.record_invalid(format!("Invalid header name: {}", e));
                    continue;
                }
            };
            match value.try_into() {
                Ok(value) => {
                    self.headers.append(name, value);
                }
                Err(e) => self.record_invalid(format!("Invalid header value for {}: {}", name, e)),
            }
        }
        self
    }

    /// Appends a single header.
    pub fn with_header<K, V>(self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: fmt::Display,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: fmt::Display,
    {
        self.with_headers([(name, value)])
    }

    /// Sets `Content-Type: application/json`, replacing any previous value.
    pub fn as_json(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Sets `Content-Type: application/x-www-form-urlencoded`, replacing any
    /// previous value. The body is then sent form-encoded.
    pub fn as_form(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    ///
    /// An empty or absent token removes any existing `Authorization` header,
    /// so requests can be built the same way whether or not a token applies.
    pub fn with_auth<'a>(mut self, access_token: impl Into<Option<&'a str>>) -> Self {
        match access_token.into().filter(|token| !token.is_empty()) {
            Some(token) => self.set_authorization(format!("Bearer {}", token)),
            None => {
                self.headers.remove(AUTHORIZATION);
                self
            }
        }
    }

    /// Sets `Authorization: Basic base64(<username>:<password>)`.
    pub fn with_basic_auth(self, username: &str, password: &str) -> Self {
        let credentials = BASE64_STANDARD.encode(format!("{}:{}", username, password));
        self.set_authorization(format!("Basic {}", credentials))
    }

    /// Builds the request. This never fails; problems are reported when the
    /// request is executed or its URI is constructed.
    pub fn build(&self) -> Request {
        Request {
            host: self.host.clone(),
            port: self.port,
            scheme: self.scheme.clone(),
            path: self.path.clone(),
            query_parameters: self.query_parameters.clone(),
            body_parameters: self.body_parameters.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout,
            invalid_header: self.invalid_header.clone(),
        }
    }

    fn set_authorization(mut self, value: String) -> Self {
        match HeaderValue::try_from(value) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => self.record_invalid(format!("Invalid authorization header: {}", e)),
        }
        self
    }

    fn record_invalid(&mut self, message: String) {
        tracing::warn!(error = %message, "Ignoring invalid header");
        self.invalid_header.get_or_insert(message);
    }
}

/// Everything needed to perform one HTTP call.
///
/// # Examples
///
/// ```
/// use spotify_webapi_core::Request;
///
/// let request = Request::builder()
///     .with_host("such.api.wow")
///     .with_scheme("https")
///     .with_port(1337)
///     .with_path("/v1/users/meriosweg")
///     .build();
///
/// assert_eq!(request.uri().unwrap(), "https://such.api.wow:1337/v1/users/meriosweg");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    host: String,
    port: u16,
    scheme: String,
    path: String,
    query_parameters: QueryParameters,
    body_parameters: Option<BodyParameters>,
    headers: HeaderMap,
    timeout: Duration,
    invalid_header: Option<String>,
}

impl Request {
    /// Creates a new, empty [`RequestBuilder`].
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_parameters(&self) -> &QueryParameters {
        &self.query_parameters
    }

    pub fn body_parameters(&self) -> Option<&BodyParameters> {
        self.body_parameters.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The configured timeout. `Duration::ZERO` means no timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `scheme://host[:port]/path`.
    ///
    /// The port is left out when it is the default for the scheme (80 for
    /// `http`, 443 for `https`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the scheme, host or port is
    /// missing, or if they do not form a valid URL.
    pub fn uri(&self) -> Result<String> {
        Ok(self.parsed_uri()?.to_string())
    }

    /// Returns [`uri`](Self::uri) followed by the query string.
    pub fn url(&self) -> Result<String> {
        Ok(format!("{}{}", self.uri()?, self.query_parameter_string()))
    }

    /// Returns `?k=v&...`, or an empty string when there are no parameters.
    pub fn query_parameter_string(&self) -> String {
        if self.query_parameters.is_empty() {
            String::new()
        } else {
            format!("?{}", self.query_parameters)
        }
    }

    /// Whether the body is sent as `application/x-www-form-urlencoded`.
    ///
    /// Decided by the last `Content-Type` value; parameters such as
    /// `charset` are ignored.
    pub fn is_form_encoded(&self) -> bool {
        is_form_content_type(&self.headers)
    }

    /// Executes the request and returns the outcome.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use spotify_webapi_core::{HttpManager, Request};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), spotify_webapi_core::Error> {
    /// let manager = HttpManager::new()?;
    /// let response = Request::builder()
    ///     .with_scheme("https")
    ///     .with_host("api.spotify.com")
    ///     .with_port(443)
    ///     .with_path("/v1/albums/0sNOF9WDwhWunNAHPD3Baj")
    ///     .with_auth("access-token")
    ///     .build()
    ///     .execute(&manager, Method::GET)
    ///     .await?;
    /// println!("{}", response.body["name"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, manager: &HttpManager, method: Method) -> Result<Response> {
        manager.send(method, self).await
    }

    /// Executes the request and hands the outcome to `callback`.
    ///
    /// The callback runs exactly once, with either the response or the error.
    /// Nothing is returned to the caller.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use spotify_webapi_core::{HttpManager, Request};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), spotify_webapi_core::Error> {
    /// let manager = HttpManager::new()?;
    /// Request::builder()
    ///     .with_scheme("https")
    ///     .with_host("api.spotify.com")
    ///     .with_port(443)
    ///     .with_path("/v1/me")
    ///     .build()
    ///     .execute_with_callback(&manager, Method::GET, |result| match result {
    ///         Ok(response) => println!("Hello {}", response.body["display_name"]),
    ///         Err(e) => eprintln!("{}", e),
    ///     })
    ///     .await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute_with_callback<F>(&self, manager: &HttpManager, method: Method, callback: F)
    where
        F: FnOnce(Result<Response>),
    {
        callback(manager.send(method, self).await);
    }

    /// Fails if the builder recorded an invalid header.
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.invalid_header {
            Some(message) => Err(Error::InvalidRequest(message.clone())),
            None => Ok(()),
        }
    }

    /// Serializes the body for the wire, if there is one, as described by the
    /// request's own headers.
    #[cfg(test)]
    pub(crate) fn serialized_body(&self) -> Result<Option<String>> {
        self.serialized_body_for(&self.headers)
    }

    /// Serializes the body according to the `Content-Type` in `headers`.
    pub(crate) fn serialized_body_for(&self, headers: &HeaderMap) -> Result<Option<String>> {
        self.body_parameters
            .as_ref()
            .map(|body| body.serialize(is_form_content_type(headers)))
            .transpose()
    }

    pub(crate) fn parsed_url(&self) -> Result<Url> {
        let url = self.url()?;
        Url::parse(&url).map_err(|e| Error::InvalidRequest(format!("Invalid URL {}: {}", url, e)))
    }

    fn parsed_uri(&self) -> Result<Url> {
        if self.scheme.is_empty() || self.host.is_empty() || self.port == 0 {
            return Err(Error::InvalidRequest(
                "Missing components necessary to construct URI".to_string(),
            ));
        }

        let mut uri = Url::parse(&format!("{}://{}", self.scheme, self.host))
            .map_err(|e| Error::InvalidRequest(format!("Invalid URI: {}", e)))?;

        if !is_default_port(&self.scheme, self.port) {
            uri.set_port(Some(self.port)).map_err(|()| {
                Error::InvalidRequest(format!("Cannot set port {} on {}", self.port, uri))
            })?;
        }

        if !self.path.is_empty() {
            uri.set_path(&self.path);
        }

        Ok(uri)
    }
}

/// Whether the last `Content-Type` in `headers` is the form media type.
pub(crate) fn is_form_content_type(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_TYPE)
        .iter()
        .last()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}
