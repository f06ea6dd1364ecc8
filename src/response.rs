//! The success envelope returned for 2xx responses.

use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A successful (2xx) response.
///
/// `body` holds the parsed JSON body, or `Value::Null` when the body was
/// empty or not JSON. The raw text is kept alongside for debugging.
///
/// # Examples
///
/// ```no_run
/// use spotify_webapi_core::{endpoints, HttpManager};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Album {
///     name: String,
/// }
///
/// # async fn example() -> Result<(), spotify_webapi_core::Error> {
/// let manager = HttpManager::new()?;
/// let request = endpoints::web_api_builder("access-token")
///     .with_path("/v1/albums/0sNOF9WDwhWunNAHPD3Baj")
///     .build();
///
/// let response = manager.get(&request).await?;
/// println!("Status: {}", response.status);
/// println!("Request took {:?}", response.latency);
///
/// let album: Album = response.json()?;
/// println!("Album: {}", album.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The parsed response body.
    pub body: Value,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl Response {
    /// Creates a new `Response`, parsing `raw_body` as JSON when possible.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spotify_webapi_core::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     r#"{"id":"42"}"#.to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    /// assert_eq!(response.body["id"], "42");
    ///
    /// let empty = Response::new(
    ///     String::new(),
    ///     StatusCode::NO_CONTENT,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    /// assert!(empty.body.is_null());
    /// ```
    pub fn new(raw_body: String, status: StatusCode, headers: HeaderMap, latency: Duration) -> Self {
        let body = serde_json::from_str(&raw_body).unwrap_or(Value::Null);
        Self {
            body,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body).map_err(|e| {
            tracing::error!(
                error = %e,
                raw_response = %self.raw_body,
                "Failed to deserialize response"
            );
            Error::Serialization(e.to_string())
        })
    }

    /// Returns a header value by name. Lookup is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spotify_webapi_core::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(
    ///     String::new(),
    ///     StatusCode::OK,
    ///     headers,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(response.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
