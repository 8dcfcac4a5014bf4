#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("GET request needs a non-empty URL")]
    MissingUrl,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Foursquare API error {code}: {detail}")]
    Api { code: u16, detail: String },
    #[error("Response decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Geolocation is unavailable: {0}")]
    Geolocation(String),
    #[error("Map widget error: {0}")]
    Widget(String),
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}
