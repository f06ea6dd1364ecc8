//! Fetches an application token and looks up an artist.
//!
//! This demo shows how to:
//! - Obtain a token with the Client Credentials flow
//! - Build a Web API request with query parameters and a timeout
//! - Handle the classified error kinds
//!
//! Run with:
//! `SPOTIFY_CLIENT_ID=... SPOTIFY_CLIENT_SECRET=... cargo run --example client_credentials`

use http::Method;
use serde::Deserialize;
use spotify_webapi_core::{auth, endpoints, Error, HttpManager};

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
    genres: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("spotify_webapi_core=debug,client_credentials=info")
        .init();

    let client_id = std::env::var("SPOTIFY_CLIENT_ID")
        .map_err(|_| Error::Configuration("SPOTIFY_CLIENT_ID is not set".to_string()))?;
    let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
        .map_err(|_| Error::Configuration("SPOTIFY_CLIENT_SECRET is not set".to_string()))?;

    let manager = HttpManager::builder()
        .user_agent("spotify-webapi-core-demo/0.1")
        .build()?;

    let grant = auth::client_credentials_grant(&manager, &client_id, &client_secret).await?;
    println!("Got a {} token valid for {}s", grant.token_type, grant.expires_in);

    let request = endpoints::web_api_builder(grant.access_token.as_str())
        .with_path("/v1/artists/0OdUWJ0sBjDrqHygGUXeCF")
        .with_query_parameters([("market", "SE")])
        .with_timeout(5_000)
        .build();

    match request.execute(&manager, Method::GET).await {
        Ok(response) => {
            let artist: Artist = response.json()?;
            println!("{} ({})", artist.name, artist.genres.join(", "));
            println!("Answered in {:?}", response.latency);
        }
        Err(Error::Regular(details)) => {
            eprintln!("Web API error {}: {}", details.status, details.message);
        }
        Err(Error::Timeout { timeout }) => eprintln!("No answer within {:?}", timeout),
        Err(e) => return Err(e),
    }

    Ok(())
}
