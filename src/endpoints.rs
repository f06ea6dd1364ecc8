//! Builder presets for the Spotify services.

use crate::RequestBuilder;

/// Host of the Web API.
pub const WEB_API_HOST: &str = "api.spotify.com";

/// Host of the Accounts service (authorization and tokens).
pub const ACCOUNTS_HOST: &str = "accounts.spotify.com";

pub const DEFAULT_PORT: u16 = 443;

pub const DEFAULT_SCHEME: &str = "https";

/// Returns a builder aimed at the Web API, authorized with `access_token`.
///
/// Passing `None` or an empty token builds an unauthenticated request.
///
/// # Examples
///
/// ```
/// use spotify_webapi_core::endpoints;
///
/// let request = endpoints::web_api_builder("token")
///     .with_path("/v1/artists/0oSGxfWSnnOXhD2fKuz2Gy")
///     .build();
///
/// assert_eq!(request.uri().unwrap(), "https://api.spotify.com/v1/artists/0oSGxfWSnnOXhD2fKuz2Gy");
/// assert_eq!(request.headers()["authorization"], "Bearer token");
/// ```
pub fn web_api_builder<'a>(access_token: impl Into<Option<&'a str>>) -> RequestBuilder {
    RequestBuilder::new()
        .with_host(WEB_API_HOST)
        .with_port(DEFAULT_PORT)
        .with_scheme(DEFAULT_SCHEME)
        .with_auth(access_token)
}

/// Returns a builder aimed at the Accounts service.
pub fn accounts_builder() -> RequestBuilder {
    RequestBuilder::new()
        .with_host(ACCOUNTS_HOST)
        .with_port(DEFAULT_PORT)
        .with_scheme(DEFAULT_SCHEME)
}
