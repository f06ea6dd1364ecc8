//! # spotify-webapi-core - Request construction and execution for the Spotify Web API
//!
//! This crate is the core that endpoint-specific methods are built on. It
//! provides a fluent request builder, URI/query/body serialization, and an
//! HTTP execution manager that enforces timeouts and classifies error
//! responses into a small, closed set of error kinds.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spotify_webapi_core::{endpoints, HttpManager};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Album {
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), spotify_webapi_core::Error> {
//!     let manager = HttpManager::new()?;
//!
//!     // GET with optional query parameters; `None` values are left out
//!     let request = endpoints::web_api_builder("access-token")
//!         .with_path("/v1/albums/0sNOF9WDwhWunNAHPD3Baj")
//!         .with_query_parameters([("market", Some("SE")), ("locale", None)])
//!         .with_timeout(10_000)
//!         .build();
//!     let album: Album = request.execute(&manager, http::Method::GET).await?.json()?;
//!     println!("Album: {}", album.name);
//!
//!     // PUT with a JSON body
//!     let request = endpoints::web_api_builder("access-token")
//!         .with_path("/v1/me/player/shuffle")
//!         .with_query_parameters(json!({ "state": true }))
//!         .build();
//!     let response = manager.put(&request).await?;
//!     println!("Shuffle set, status {}", response.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Non-2xx responses are classified by the shape of their body, and every
//! classified error keeps the status, headers and body:
//!
//! ```no_run
//! use spotify_webapi_core::{endpoints, Error, HttpManager};
//!
//! # async fn example() -> Result<(), Error> {
//! # let manager = HttpManager::new()?;
//! let request = endpoints::web_api_builder("expired-token").with_path("/v1/me").build();
//!
//! match manager.get(&request).await {
//!     Ok(response) => println!("Hello {}", response.body["display_name"]),
//!     Err(Error::Regular(details)) if details.status.as_u16() == 401 => {
//!         eprintln!("Token expired: {}", details.message);
//!     }
//!     Err(Error::Authentication(details)) => eprintln!("Auth failed: {}", details.body["error"]),
//!     Err(Error::Timeout { timeout }) => eprintln!("No answer within {:?}", timeout),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Callbacks
//!
//! [`Request::execute_with_callback`] delivers the same single outcome to a
//! closure instead of returning it.

pub mod auth;
mod body;
pub mod endpoints;
mod error;
mod http_manager;
mod query;
mod request;
mod response;

pub use body::BodyParameters;
pub use error::{Error, ResponseError, Result};
pub use http_manager::{HttpManager, HttpManagerBuilder};
pub use query::{IntoQueryParameters, QueryParameters, QueryValue};
pub use request::{Request, RequestBuilder};
pub use response::Response;
