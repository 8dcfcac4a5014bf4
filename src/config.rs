use serde::Deserialize;
use url::Url;

use crate::cookies::TOKEN_COOKIE_NAME;
use crate::error::Error;
use crate::map::MapSettings;
use crate::oauth::OAuthConfig;

/// Search radius used until the user picks another one.
pub const DEFAULT_RADIUS: u32 = 500;
/// Maximum number of venues requested per search.
pub const RESULT_LIMIT: u32 = 20;
/// Foursquare `v` parameter (API version date).
pub const API_VERSION: &str = "20160801";
/// Foursquare `m` parameter (response mode).
pub const API_MODE: &str = "foursquare";

/// Runtime settings shared by the service and the browser glue.
#[derive(Debug, Clone)]
pub(crate) struct VenueSettings {
    pub(crate) api_url: Url,
    pub(crate) maps_api_key: String,
    pub(crate) maps_callback: String,
    pub(crate) cookie_name: String,
    pub(crate) token_ttl_days: Option<u32>,
    pub(crate) default_radius: u32,
    pub(crate) map: MapSettings,
}

impl VenueSettings {
    fn defaults(maps_api_key: String) -> Self {
        Self {
            api_url: "https://api.foursquare.com/v2"
                .parse()
                .expect("valid default URL"),
            maps_api_key,
            maps_callback: "googleMapCallback".into(),
            cookie_name: TOKEN_COOKIE_NAME.into(),
            token_ttl_days: None,
            default_radius: DEFAULT_RADIUS,
            map: MapSettings::default(),
        }
    }
}

/// Venue map configuration.
///
/// Required fields (`oauth`, `maps_api_key`) are constructor parameters.
///
/// Use [`from_json()`](VenueMapConfig::from_json) when the page hands its
/// settings over as JSON, or [`new()`](VenueMapConfig::new) with `with_*`
/// methods for full control.
#[derive(Debug, Clone)]
pub struct VenueMapConfig {
    pub(crate) oauth: OAuthConfig,
    pub(crate) settings: VenueSettings,
}

/// JSON shape accepted by [`VenueMapConfig::from_json`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    client_id: String,
    redirect_uri: String,
    maps_api_key: String,
    auth_url: Option<String>,
    api_url: Option<String>,
    maps_callback: Option<String>,
    cookie_name: Option<String>,
    token_ttl_days: Option<u32>,
    default_radius: Option<u32>,
    map: Option<MapSettings>,
}

impl VenueMapConfig {
    /// Create config with the required OAuth settings and Google Maps key.
    ///
    /// All optional fields use defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(oauth: OAuthConfig, maps_api_key: impl Into<String>) -> Self {
        Self {
            oauth,
            settings: VenueSettings::defaults(maps_api_key.into()),
        }
    }

    /// Create config from a JSON object.
    ///
    /// # Required keys
    /// - `client_id`: Foursquare OAuth2 client ID
    /// - `redirect_uri`: this application's URL (must be a valid URL)
    /// - `maps_api_key`: Google Maps JavaScript API key
    ///
    /// # Optional keys
    /// - `auth_url`, `api_url`: override Foursquare endpoints
    /// - `maps_callback`: global callback name for the Maps script
    /// - `cookie_name`, `token_ttl_days`: token cookie settings
    /// - `default_radius`: initial search radius
    /// - `map`: [`MapSettings`] overrides
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON is malformed, a required key is
    /// missing, or a URL is invalid.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;

        let redirect_uri = parse_url("redirect_uri", &raw.redirect_uri)?;
        let mut oauth = OAuthConfig::new(raw.client_id, redirect_uri);
        if let Some(url_str) = raw.auth_url {
            oauth = oauth.with_auth_url(parse_url("auth_url", &url_str)?);
        }

        let mut config = Self::new(oauth, raw.maps_api_key);
        if let Some(url_str) = raw.api_url {
            config = config.with_api_url(parse_url("api_url", &url_str)?);
        }
        if let Some(callback) = raw.maps_callback {
            config = config.with_maps_callback(callback);
        }
        if let Some(name) = raw.cookie_name {
            config = config.with_cookie_name(name);
        }
        if let Some(days) = raw.token_ttl_days {
            config = config.with_token_ttl_days(days);
        }
        if let Some(radius) = raw.default_radius {
            config = config.with_default_radius(radius);
        }
        if let Some(map) = raw.map {
            config = config.with_map_settings(map);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.oauth.client_id.is_empty() {
            return Err(Error::Config("client_id must not be empty".into()));
        }
        if self.settings.maps_callback.is_empty()
            || !self
                .settings
                .maps_callback
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Config(
                "maps_callback must be a plain JavaScript identifier".into(),
            ));
        }
        if self.settings.default_radius == 0 {
            return Err(Error::Config("default_radius must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_api_url(mut self, url: Url) -> Self {
        self.settings.api_url = url;
        self
    }

    #[must_use]
    pub fn with_maps_callback(mut self, name: impl Into<String>) -> Self {
        self.settings.maps_callback = name.into();
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.cookie_name = name.into();
        self
    }

    /// Keep the token cookie for `days` days. Zero means a session cookie.
    #[must_use]
    pub fn with_token_ttl_days(mut self, days: u32) -> Self {
        self.settings.token_ttl_days = (days > 0).then_some(days);
        self
    }

    #[must_use]
    pub fn with_default_radius(mut self, radius: u32) -> Self {
        self.settings.default_radius = radius;
        self
    }

    #[must_use]
    pub fn with_map_settings(mut self, map: MapSettings) -> Self {
        self.settings.map = map;
        self
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }

    #[must_use]
    pub fn maps_api_key(&self) -> &str {
        &self.settings.maps_api_key
    }

    #[must_use]
    pub fn maps_callback(&self) -> &str {
        &self.settings.maps_callback
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.settings.cookie_name
    }

    #[must_use]
    pub fn token_ttl_days(&self) -> Option<u32> {
        self.settings.token_ttl_days
    }

    #[must_use]
    pub fn default_radius(&self) -> u32 {
        self.settings.default_radius
    }

    #[must_use]
    pub fn map_settings(&self) -> &MapSettings {
        &self.settings.map
    }

    /// `<api_url>/venues/search`
    #[must_use]
    pub fn venues_search_url(&self) -> String {
        format!(
            "{}/venues/search",
            self.settings.api_url.as_str().trim_end_matches('/')
        )
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, Error> {
    value
        .parse()
        .map_err(|e| Error::Config(format!("{key}: {e}")))
}
