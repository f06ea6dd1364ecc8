//! OAuth helpers for the Accounts service.
//!
//! These assemble the authorize URL and the token requests of the
//! Authorization Code and Client Credentials flows. Credentials are passed in
//! by the caller; nothing is stored.

use crate::{endpoints, HttpManager, Request, Result};
use serde::Deserialize;
use serde_json::json;

const AUTHORIZE_PATH: &str = "/authorize";
const TOKEN_PATH: &str = "/api/token";

/// What the authorize endpoint hands back to the redirect URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// An authorization code, to be exchanged with
    /// [`authorization_code_grant`].
    #[default]
    Code,
    /// An access token directly (implicit grant).
    Token,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Code => "code",
            ResponseType::Token => "token",
        }
    }
}

/// Builder for the URL where a user grants the application permissions.
///
/// # Examples
///
/// ```
/// use spotify_webapi_core::auth::AuthorizeUrl;
///
/// let url = AuthorizeUrl::new("5fe01282e44241328a84e7c5cc169165", "https://example.com/callback")
///     .scopes(["user-read-private", "user-read-email"])
///     .state("some-state-of-my-choice")
///     .show_dialog(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     url,
///     "https://accounts.spotify.com/authorize?client_id=5fe01282e44241328a84e7c5cc169165\
///      &response_type=code&redirect_uri=https%3A%2F%2Fexample.com%2Fcallback\
///      &scope=user-read-private%2Cuser-read-email&state=some-state-of-my-choice&show_dialog=true"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizeUrl {
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    state: Option<String>,
    show_dialog: bool,
    response_type: ResponseType,
}

impl AuthorizeUrl {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            state: None,
            show_dialog: false,
            response_type: ResponseType::Code,
        }
    }

    /// Sets the requested scopes. They are sent comma-separated.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets an opaque value echoed back to the redirect URI, used to guard
    /// against CSRF.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Forces the user to approve the application again even if they already
    /// have.
    pub fn show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = show_dialog;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Assembles the authorize URL.
    pub fn build(&self) -> Result<String> {
        endpoints::accounts_builder()
            .with_path(AUTHORIZE_PATH)
            .with_query_parameters(json!({
                "client_id": self.client_id,
                "response_type": self.response_type.as_str(),
                "redirect_uri": self.redirect_uri,
                "scope": self.scopes.join(","),
                "state": self.state,
                "show_dialog": self.show_dialog,
            }))
            .build()
            .url()
    }
}

/// Token returned by the Client Credentials flow.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientCredentialsGrant {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Tokens returned when exchanging an authorization code.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuthorizationCodeGrant {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: String,
    pub scope: String,
    pub token_type: String,
}

/// Token returned when refreshing an access token.
///
/// The Accounts service only sometimes rotates the refresh token.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RefreshAccessToken {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub token_type: String,
}

/// Builds the Client Credentials token request.
pub fn client_credentials_request(client_id: &str, client_secret: &str) -> Request {
    endpoints::accounts_builder()
        .with_path(TOKEN_PATH)
        .with_body_parameters(json!({ "grant_type": "client_credentials" }))
        .with_basic_auth(client_id, client_secret)
        .as_form()
        .build()
}

/// Requests an application access token with the Client Credentials flow.
///
/// # Examples
///
/// ```no_run
/// use spotify_webapi_core::{auth, HttpManager};
///
/// # async fn example() -> Result<(), spotify_webapi_core::Error> {
/// let manager = HttpManager::new()?;
/// let grant = auth::client_credentials_grant(&manager, "client-id", "client-secret").await?;
/// println!("Token valid for {}s", grant.expires_in);
/// # Ok(())
/// # }
/// ```
pub async fn client_credentials_grant(
    manager: &HttpManager,
    client_id: &str,
    client_secret: &str,
) -> Result<ClientCredentialsGrant> {
    manager
        .post(&client_credentials_request(client_id, client_secret))
        .await?
        .json()
}

/// Credentials of a registered application.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Builds the request exchanging an authorization code for tokens.
pub fn authorization_code_request(credentials: &ClientCredentials, code: &str) -> Request {
    endpoints::accounts_builder()
        .with_path(TOKEN_PATH)
        .with_body_parameters(json!({
            "grant_type": "authorization_code",
            "redirect_uri": credentials.redirect_uri,
            "code": code,
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
        }))
        .as_form()
        .build()
}

/// Exchanges an authorization code for an access and refresh token.
pub async fn authorization_code_grant(
    manager: &HttpManager,
    credentials: &ClientCredentials,
    code: &str,
) -> Result<AuthorizationCodeGrant> {
    manager
        .post(&authorization_code_request(credentials, code))
        .await?
        .json()
}

/// Builds the request refreshing an access token.
pub fn refresh_access_token_request(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Request {
    endpoints::accounts_builder()
        .with_path(TOKEN_PATH)
        .with_body_parameters(json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        }))
        .with_basic_auth(client_id, client_secret)
        .as_form()
        .build()
}

/// Obtains a new access token using a refresh token.
pub async fn refresh_access_token(
    manager: &HttpManager,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<RefreshAccessToken> {
    manager
        .post(&refresh_access_token_request(
            client_id,
            client_secret,
            refresh_token,
        ))
        .await?
        .json()
}
