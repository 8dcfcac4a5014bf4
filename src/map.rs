use std::cell::{Cell, RefCell};
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::venue::{Coordinates, Venue};

/// Fixed presentation settings for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct MapSettings {
    /// CSS selector of the element the map is drawn into.
    pub container: String,
    pub center: Coordinates,
    pub zoom: u8,
    pub map_type: String,
    pub fullscreen_control: bool,
    pub map_type_control: bool,
    pub scrollwheel: bool,
    pub street_view_control: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            container: ".js-map".into(),
            center: Coordinates::new(42.696832, 23.289583),
            zoom: 14,
            map_type: "roadmap".into(),
            fullscreen_control: false,
            map_type_control: false,
            scrollwheel: false,
            street_view_control: false,
        }
    }
}

/// What a single marker shows: its position and the popup text.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: Coordinates,
    pub name: String,
    pub address: String,
}

impl From<&Venue> for MarkerSpec {
    fn from(venue: &Venue) -> Self {
        Self {
            position: Coordinates::new(venue.location.lat, venue.location.lng),
            name: venue.name.clone(),
            address: venue.address().to_owned(),
        }
    }
}

/// The third-party map widget.
///
/// Implementations own the widget objects; the renderer only keeps the
/// marker handles they return. Clicking a marker opens a popup with
/// [`MarkerSpec::name`] and [`MarkerSpec::address`].
pub trait MapWidget {
    type Marker;

    /// Load the widget's code and resolve once it is usable.
    fn load(&self) -> impl Future<Output = Result<(), Error>>;

    /// Construct the map instance.
    fn create_map(&self, settings: &MapSettings) -> Result<(), Error>;

    /// Put a marker on the map.
    fn add_marker(&self, marker: &MarkerSpec) -> Result<Self::Marker, Error>;

    /// Take a marker off the map.
    fn remove_marker(&self, marker: Self::Marker);
}

/// Owns the map widget and the markers currently displayed.
pub struct MapRenderer<W: MapWidget> {
    widget: W,
    settings: MapSettings,
    started: Cell<bool>,
    ready: Cell<bool>,
    markers: RefCell<Vec<W::Marker>>,
}

impl<W: MapWidget> MapRenderer<W> {
    #[must_use]
    pub fn new(widget: W, settings: MapSettings) -> Self {
        Self {
            widget,
            settings,
            started: Cell::new(false),
            ready: Cell::new(false),
            markers: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Whether the map instance exists.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.borrow().len()
    }

    /// Load the widget and build the map. Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Widget`] if the widget fails to load or construct.
    pub async fn initialize(&self) -> Result<(), Error> {
        if self.started.replace(true) {
            return Ok(());
        }

        self.widget.load().await?;
        self.widget.create_map(&self.settings)?;
        self.ready.set(true);

        tracing::info!(
            container = %self.settings.container,
            zoom = self.settings.zoom,
            "Map initialized"
        );
        Ok(())
    }

    /// Replace every displayed marker with one per venue.
    ///
    /// Returns the number of markers now on the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Widget`] if the map is not initialized yet or the
    /// widget refuses a marker. Markers already removed stay removed.
    pub fn set_markers(&self, venues: &[Venue]) -> Result<usize, Error> {
        if !self.is_ready() {
            return Err(Error::Widget("map is not initialized".into()));
        }

        let mut markers = self.markers.borrow_mut();
        for marker in markers.drain(..) {
            self.widget.remove_marker(marker);
        }
        for venue in venues {
            markers.push(self.widget.add_marker(&MarkerSpec::from(venue))?);
        }

        tracing::debug!(count = markers.len(), "Markers replaced");
        Ok(markers.len())
    }
}
