//! Error types for Web API calls.
//!
//! Every call resolves to exactly one outcome. Failures are described by the
//! closed [`Error`] enum: request construction problems, timeouts, transport
//! failures, and non-2xx responses classified by the shape of their body.
//! Classified variants keep the status, headers, parsed body and raw body of
//! the response for inspection.

use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, SystemTime};

const REGULAR_PREFIX: &str = "An error occurred while communicating with Spotify's Web API.\nDetails: ";
const AUTHENTICATION_PREFIX: &str =
    "An authentication error occurred while communicating with Spotify's Web API.\nDetails: ";

/// The main error type for Web API calls.
///
/// # Examples
///
/// ```no_run
/// use spotify_webapi_core::{endpoints, Error, HttpManager};
///
/// # async fn example() -> Result<(), Error> {
/// let manager = HttpManager::new()?;
/// let request = endpoints::web_api_builder(Some("token"))
///     .with_path("/v1/me/player")
///     .build();
///
/// match manager.get(&request).await {
///     Ok(response) => println!("Playing: {}", response.body),
///     Err(Error::Player(details)) => {
///         eprintln!("Player refused ({}): {}", details.status, details.body["error"]["reason"]);
///     }
///     Err(Error::Timeout { timeout }) => eprintln!("Gave up after {:?}", timeout),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be constructed.
    ///
    /// Raised before any network call when the scheme, host or port is
    /// missing, or when the builder was given an invalid header.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request did not complete within the configured timeout.
    #[error(
        "A timeout occurred while communicating with Spotify's Web API: request took longer than {}ms",
        .timeout.as_millis()
    )]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// An OAuth style error: `{"error": "...", "error_description": "..."}`.
    #[error("{0}")]
    Authentication(ResponseError),

    /// A regular Web API error: `{"error": {"status": 400, "message": "..."}}`.
    #[error("{0}")]
    Regular(ResponseError),

    /// A player error, which additionally carries a `reason`:
    /// `{"error": {"status": 403, "message": "...", "reason": "..."}}`.
    #[error("{0}")]
    Player(ResponseError),

    /// Any other non-2xx response, including bodies that are not JSON.
    #[error("{0}")]
    Generic(ResponseError),

    /// A network-level failure (DNS lookup, refused connection, reset).
    ///
    /// The underlying `reqwest::Error` is passed through unchanged.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body could not be serialized for its content type, or a
    /// response body did not match the requested type.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The [`HttpManager`](crate::HttpManager) was configured with invalid
    /// settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Details of a non-2xx response.
#[derive(Debug, Clone)]
pub struct ResponseError {
    /// Human readable description built from the response body.
    pub message: String,
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The parsed response body, or `Value::Null` if it was not JSON.
    pub body: Value,
    /// The raw response body.
    pub raw_body: String,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Classifies a non-2xx response by the shape of its body.
    ///
    /// The first matching rule wins:
    ///
    /// 1. `error` is an object with a string `reason` → [`Error::Player`]
    /// 2. `error` is an object → [`Error::Regular`]
    /// 3. `error` is a string → [`Error::Authentication`]
    /// 4. anything else → [`Error::Generic`]
    ///
    /// # Examples
    ///
    /// ```
    /// use spotify_webapi_core::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::from_response(
    ///     StatusCode::BAD_REQUEST,
    ///     HeaderMap::new(),
    ///     r#"{"error":{"status":400,"message":"m"}}"#.to_string(),
    /// );
    ///
    /// assert!(matches!(err, Error::Regular(_)));
    /// assert!(err.to_string().ends_with("Details: m."));
    /// ```
    pub fn from_response(status: StatusCode, headers: HeaderMap, raw_body: String) -> Self {
        let body: Value = serde_json::from_str(&raw_body).unwrap_or(Value::Null);

        let (kind, message) = match &body["error"] {
            Value::Object(error) if error.get("reason").is_some_and(Value::is_string) => {
                let message = details(REGULAR_PREFIX, error.get("message"), error.get("reason"));
                (ErrorKind::Player, message)
            }
            Value::Object(error) => {
                let message = details(REGULAR_PREFIX, error.get("message"), None);
                (ErrorKind::Regular, message)
            }
            error @ Value::String(_) => {
                let message = details(AUTHENTICATION_PREFIX, Some(error), body.get("error_description"));
                (ErrorKind::Authentication, message)
            }
            _ => (ErrorKind::Generic, generic_message(status, &body, &raw_body)),
        };

        let response = ResponseError {
            message,
            status,
            headers,
            body,
            raw_body,
        };

        match kind {
            ErrorKind::Player => Error::Player(response),
            ErrorKind::Regular => Error::Regular(response),
            ErrorKind::Authentication => Error::Authentication(response),
            ErrorKind::Generic => Error::Generic(response),
        }
    }

    /// Returns the response details for classified HTTP errors.
    pub fn response(&self) -> Option<&ResponseError> {
        match self {
            Error::Authentication(details)
            | Error::Regular(details)
            | Error::Player(details)
            | Error::Generic(details) => Some(details),
            Error::InvalidRequest(_)
            | Error::Timeout { .. }
            | Error::Transport(_)
            | Error::Serialization(_)
            | Error::Configuration(_) => None,
        }
    }

    /// Returns the HTTP status code if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|details| details.status)
    }

    /// Returns the response headers if this error came from a response.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.response().map(|details| &details.headers)
    }

    /// Returns the parsed response body if this error came from a response.
    pub fn body(&self) -> Option<&Value> {
        self.response().map(|details| &details.body)
    }

    /// Returns the raw response body if this error came from a response.
    pub fn raw_response(&self) -> Option<&str> {
        self.response().map(|details| details.raw_body.as_str())
    }

    /// Returns `true` if the configured timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns the delay requested by a `Retry-After` response header.
    ///
    /// Both delay-seconds and HTTP-date values are understood. This is purely
    /// informational; nothing in this crate waits or retries.
    ///
    /// # Examples
    ///
    /// ```
    /// use spotify_webapi_core::Error;
    /// use http::{HeaderMap, HeaderValue, StatusCode};
    /// use std::time::Duration;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", HeaderValue::from_static("5"));
    ///
    /// let err = Error::from_response(StatusCode::TOO_MANY_REQUESTS, headers, String::new());
    /// assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    /// ```
    pub fn retry_after(&self) -> Option<Duration> {
        parse_retry_after(self.headers()?)
    }
}

enum ErrorKind {
    Player,
    Regular,
    Authentication,
    Generic,
}

/// Builds `<prefix><detail>[ <extra>].`
fn details(prefix: &str, detail: Option<&Value>, extra: Option<&Value>) -> String {
    let mut message = format!("{}{}", prefix, detail.map(display_value).unwrap_or_default());
    if let Some(extra) = extra.map(display_value).filter(|extra| !extra.is_empty()) {
        message.push(' ');
        message.push_str(&extra);
    }
    message.push('.');
    message
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn generic_message(status: StatusCode, body: &Value, raw_body: &str) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Null if !raw_body.trim().is_empty() => raw_body.to_string(),
        _ => format!(
            "An unexpected error occurred while communicating with Spotify's Web API (status {}).",
            status.as_u16()
        ),
    }
}

/// Parses the Retry-After header.
///
/// Supports both delay-seconds (integer) and HTTP-date formats.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;

    if let Ok(seconds) = header.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    Some(
        date_time
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

/// A specialized `Result` type for Web API calls.
pub type Result<T> = std::result::Result<T, Error>;
