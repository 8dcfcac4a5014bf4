#![doc = include_str!("../README.md")]

pub mod config;
pub mod cookies;
pub mod error;
pub mod http;
pub mod location;
pub mod map;
pub mod oauth;
pub mod page;
pub mod service;
pub mod url_params;
pub mod venue;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use config::VenueMapConfig;
pub use cookies::{CredentialStore, MemoryCookies, TOKEN_COOKIE_NAME};
pub use error::Error;
pub use http::{GetRequest, HttpClient, RawResponse, ReqwestTransport, Transport};
pub use location::{FixedLocation, LocationProvider};
pub use map::{MapRenderer, MapSettings, MapWidget, MarkerSpec};
pub use oauth::{AccessToken, OAuthConfig, TokenSource, acquire_token, token_from_redirect};
pub use page::{Page, RadiusHandler};
pub use service::{SessionState, VenueService};
pub use url_params::{append_param, append_params};
pub use venue::{Coordinates, SearchResponse, Venue, VenueLocation};
