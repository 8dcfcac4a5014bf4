//! The venue service: token lifecycle, location, search and rendering.
//!
//! ```text
//! Unauthenticated ──token──▶ Authenticated { located: false } ──position──▶ Authenticated { located: true }
//! ```
//!
//! Without a token the service shows the login link and stops there. With a
//! token it wires the radius control, reveals the page, loads the map and
//! runs the first search. The position is requested once and reused by every
//! later search.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::config::{API_MODE, API_VERSION, RESULT_LIMIT, VenueMapConfig};
use crate::cookies::CredentialStore;
use crate::error::Error;
use crate::http::{GetRequest, HttpClient, Transport};
use crate::location::LocationProvider;
use crate::map::{MapRenderer, MapWidget};
use crate::oauth::{self, AccessToken};
use crate::page::Page;
use crate::venue::{Coordinates, SearchResponse};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { located: bool },
}

/// Orchestrates one page session.
///
/// Constructed once at startup and shared as `Rc<VenueService<..>>`; all
/// state lives here rather than in globals.
pub struct VenueService<S, L, T, W: MapWidget, P> {
    config: VenueMapConfig,
    store: S,
    location: L,
    http: HttpClient<T>,
    map: MapRenderer<W>,
    page: P,
    started: Cell<bool>,
    token: OnceCell<AccessToken>,
    coordinates: OnceCell<Coordinates>,
    locating: RefCell<Option<Shared<LocalBoxFuture<'static, Result<Coordinates, String>>>>>,
}

impl<S, L, T, W, P> VenueService<S, L, T, W, P>
where
    S: CredentialStore + 'static,
    L: LocationProvider + 'static,
    T: Transport + 'static,
    W: MapWidget + 'static,
    P: Page + 'static,
{
    #[must_use]
    pub fn new(
        config: VenueMapConfig,
        store: S,
        location: L,
        transport: T,
        widget: W,
        page: P,
    ) -> Self {
        let map = MapRenderer::new(widget, config.map_settings().clone());
        Self {
            config,
            store,
            location,
            http: HttpClient::new(transport),
            map,
            page,
            started: Cell::new(false),
            token: OnceCell::new(),
            coordinates: OnceCell::new(),
            locating: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.token.get().is_none() {
            return SessionState::Unauthenticated;
        }
        SessionState::Authenticated {
            located: self.coordinates.get().is_some(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &VenueMapConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn location(&self) -> &L {
        &self.location
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    #[must_use]
    pub fn map(&self) -> &MapRenderer<W> {
        &self.map
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Start the session. Later calls return the current state untouched.
    ///
    /// # Errors
    ///
    /// Returns the first failure among token persistence, page updates, map
    /// loading, geolocation and the initial search. A missing token is not
    /// an error: it yields [`SessionState::Unauthenticated`].
    pub async fn init(self: &Rc<Self>) -> Result<SessionState, Error> {
        if self.started.replace(true) {
            return Ok(self.state());
        }

        let href = self.page.href();
        let acquired = oauth::acquire_token(
            &self.store,
            self.config.cookie_name(),
            &href,
            self.config.token_ttl_days(),
        )?;

        let Some((token, source)) = acquired else {
            self.page
                .show_login(&self.config.oauth().authorization_url())?;
            tracing::info!("No Foursquare access token, showing login");
            return Ok(SessionState::Unauthenticated);
        };
        tracing::info!(source = %source, "Foursquare access token acquired");
        let _ = self.token.set(token);

        let service = Rc::downgrade(self);
        self.page.on_radius_change(Box::new(move |radius| {
            let service = service.clone();
            async move {
                let Some(service) = service.upgrade() else {
                    return;
                };
                if let Err(e) = service.on_radius_change(radius).await {
                    tracing::error!(error = %e, radius, "Venue search failed");
                }
            }
            .boxed_local()
        }))?;
        self.page.show_main_content()?;

        // The map load runs to completion even when the position is refused.
        let (map, coordinates) =
            futures::join!(self.map.initialize(), self.current_coordinates());
        map?;
        self.search_near(coordinates?, None).await?;

        Ok(self.state())
    }

    /// Search around the user with `radius`, asking for the position only
    /// the first time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Geolocation`] if the position is unavailable, or
    /// any error from [`search_near`](Self::search_near).
    pub async fn nearby_venues(self: &Rc<Self>, radius: Option<u32>) -> Result<usize, Error> {
        let coordinates = self.current_coordinates().await?;
        self.search_near(coordinates, radius).await
    }

    /// Radius control handler: update the readout, then search again.
    ///
    /// # Errors
    ///
    /// See [`nearby_venues`](Self::nearby_venues).
    pub async fn on_radius_change(self: &Rc<Self>, radius: u32) -> Result<usize, Error> {
        self.page.set_radius_readout(radius)?;
        self.nearby_venues(Some(radius)).await
    }

    /// Query the venue search endpoint and put the results on the map.
    ///
    /// `radius` falls back to the configured default when `None` or zero.
    /// Returns the number of markers displayed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] without a token, [`Error::Http`] on
    /// transport failure, [`Error::Decode`] / [`Error::Api`] for unusable
    /// bodies, and [`Error::Widget`] if the map rejects the markers.
    pub async fn search_near(
        &self,
        coordinates: Coordinates,
        radius: Option<u32>,
    ) -> Result<usize, Error> {
        let token = self.token.get().ok_or(Error::Unauthenticated)?;
        let radius = radius
            .filter(|r| *r > 0)
            .unwrap_or(self.config.default_radius());

        let request = GetRequest::new(self.config.venues_search_url())?
            .param("oauth_token", token.as_str())
            .param("ll", coordinates.ll())
            .param("radius", radius)
            .param("limit", RESULT_LIMIT)
            .param("v", API_VERSION)
            .param("m", API_MODE);

        let response = self.http.get(request).await?;
        let parsed = SearchResponse::from_json(&response.body)?;
        if let Some(meta) = parsed.meta.as_ref().filter(|m| m.code != 200) {
            tracing::warn!(
                code = meta.code,
                error_type = ?meta.error_type,
                status = response.status,
                "Foursquare returned an error"
            );
        }

        let venues = parsed.into_venues()?;
        tracing::info!(radius, count = venues.len(), "Venues found");
        self.map.set_markers(&venues)
    }

    async fn current_coordinates(self: &Rc<Self>) -> Result<Coordinates, Error> {
        if let Some(coordinates) = self.coordinates.get() {
            return Ok(*coordinates);
        }

        // Callers arriving while a lookup is in flight share it.
        let lookup = self
            .locating
            .borrow_mut()
            .get_or_insert_with(|| {
                let service = Rc::clone(self);
                async move {
                    service
                        .location
                        .current_position()
                        .await
                        .map_err(|e| match e {
                            Error::Geolocation(message) => message,
                            other => other.to_string(),
                        })
                }
                .boxed_local()
                .shared()
            })
            .clone();

        let result = lookup.clone().await;
        {
            let mut locating = self.locating.borrow_mut();
            if locating.as_ref().is_some_and(|l| l.ptr_eq(&lookup)) {
                *locating = None;
            }
        }
        let coordinates = result.map_err(Error::Geolocation)?;

        if self.coordinates.set(coordinates).is_ok() {
            tracing::info!(
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                "Location acquired"
            );
        }
        Ok(coordinates)
    }
}
