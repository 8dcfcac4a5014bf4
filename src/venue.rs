use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A position reported by the location provider.
///
/// Obtained once per session and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `"<lat>,<lng>"`, the form the `ll` search parameter expects.
    #[must_use]
    pub fn ll(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Venue location as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VenueLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
}

/// A place record from the venue search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Venue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub location: VenueLocation,
}

impl Venue {
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: VenueLocation {
                lat,
                lng,
                address: None,
            },
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.location.address = Some(address.into());
        self
    }

    /// Address line, or an empty string when the venue has none.
    #[must_use]
    pub fn address(&self) -> &str {
        self.location.address.as_deref().unwrap_or_default()
    }
}

/// `meta` block present on every Foursquare v2 response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Meta {
    pub code: u16,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_detail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VenuesPayload {
    #[serde(default)]
    venues: Option<Vec<Venue>>,
}

/// Body of `GET /venues/search`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct SearchResponse {
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    response: VenuesPayload,
}

impl SearchResponse {
    /// Decode a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not valid JSON of this shape.
    pub fn from_json(body: &str) -> Result<Self, Error> {
        serde_json::from_str(body).map_err(Into::into)
    }

    /// The venue list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the body carries no `response.venues`
    /// (Foursquare error responses have an empty `response`).
    pub fn into_venues(self) -> Result<Vec<Venue>, Error> {
        match self.response.venues {
            Some(venues) => Ok(venues),
            None => {
                let meta = self.meta.unwrap_or_default();
                Err(Error::Api {
                    code: meta.code,
                    detail: meta
                        .error_detail
                        .or(meta.error_type)
                        .unwrap_or_else(|| "response has no venues".into()),
                })
            }
        }
    }
}
