//! In-memory stand-ins for the browser capabilities.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::error::Error;
use crate::http::{RawResponse, Transport};
use crate::location::LocationProvider;
use crate::map::{MapSettings, MapWidget, MarkerSpec};
use crate::page::{Page, RadiusHandler};
use crate::venue::Coordinates;

/// Search response body with `n` venues.
pub(crate) fn venues_body(n: usize) -> String {
    let venues = (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("v{i}"),
                "name": format!("Venue {i}"),
                "location": {"lat": 42.69 + i as f64 * 0.001, "lng": 23.32, "address": format!("Street {i}")}
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({"meta": {"code": 200}, "response": {"venues": venues}}).to_string()
}

/// Transport answering from a queue of canned responses.
#[derive(Default)]
pub(crate) struct FakeTransport {
    queue: RefCell<VecDeque<Result<RawResponse, String>>>,
    requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.queue.borrow_mut().push_back(Ok(RawResponse {
            status,
            body: body.to_owned(),
        }));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.queue.borrow_mut().push_back(Err(message.to_owned()));
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, Error> {
        self.requests.borrow_mut().push(url.to_owned());
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Http(message)),
            None => Err(Error::Http("no response queued".into())),
        }
    }
}

/// Pending until the paired sender fires or is dropped.
async fn wait_for(gate: Option<oneshot::Receiver<()>>) {
    if let Some(gate) = gate {
        let _ = gate.await;
    }
}

/// Location provider counting how often it is asked.
pub(crate) struct FakeLocation {
    result: Result<Coordinates, String>,
    calls: Cell<usize>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeLocation {
    pub(crate) fn at(coordinates: Coordinates) -> Self {
        Self {
            result: Ok(coordinates),
            calls: Cell::new(0),
            gate: RefCell::new(None),
        }
    }

    pub(crate) fn denied(message: &str) -> Self {
        Self {
            result: Err(message.to_owned()),
            calls: Cell::new(0),
            gate: RefCell::new(None),
        }
    }

    /// Keep the next lookup pending until the returned sender fires.
    pub(crate) fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl LocationProvider for FakeLocation {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        self.calls.set(self.calls.get() + 1);
        let gate = self.gate.borrow_mut().take();
        wait_for(gate).await;
        self.result.clone().map_err(Error::Geolocation)
    }
}

/// Map widget keeping its markers in a map keyed by handle.
#[derive(Default)]
pub(crate) struct FakeMap {
    load_error: RefCell<Option<String>>,
    load_gate: RefCell<Option<oneshot::Receiver<()>>>,
    load_calls: Cell<usize>,
    maps_created: Cell<usize>,
    next_id: Cell<usize>,
    markers: RefCell<BTreeMap<usize, MarkerSpec>>,
}

impl FakeMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_load(&self, message: &str) {
        *self.load_error.borrow_mut() = Some(message.to_owned());
    }

    /// Keep the next load pending until the returned sender fires.
    pub(crate) fn hold_load(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.load_gate.borrow_mut() = Some(rx);
        tx
    }

    pub(crate) fn load_calls(&self) -> usize {
        self.load_calls.get()
    }

    pub(crate) fn maps_created(&self) -> usize {
        self.maps_created.get()
    }

    /// Markers currently on the map, oldest first.
    pub(crate) fn visible(&self) -> Vec<MarkerSpec> {
        self.markers.borrow().values().cloned().collect()
    }
}

impl MapWidget for FakeMap {
    type Marker = usize;

    async fn load(&self) -> Result<(), Error> {
        self.load_calls.set(self.load_calls.get() + 1);
        let gate = self.load_gate.borrow_mut().take();
        wait_for(gate).await;
        match self.load_error.borrow().clone() {
            Some(message) => Err(Error::Widget(message)),
            None => Ok(()),
        }
    }

    fn create_map(&self, _settings: &MapSettings) -> Result<(), Error> {
        self.maps_created.set(self.maps_created.get() + 1);
        Ok(())
    }

    fn add_marker(&self, marker: &MarkerSpec) -> Result<usize, Error> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.markers.borrow_mut().insert(id, marker.clone());
        Ok(id)
    }

    fn remove_marker(&self, marker: usize) {
        self.markers.borrow_mut().remove(&marker);
    }
}

/// Page recording what the service showed.
pub(crate) struct FakePage {
    href: String,
    login_href: RefCell<Option<String>>,
    main_content_shown: Cell<bool>,
    radius_readout: Cell<Option<u32>>,
    radius_handler: RefCell<Option<RadiusHandler>>,
}

impl FakePage {
    pub(crate) fn new(href: &str) -> Self {
        Self {
            href: href.to_owned(),
            login_href: RefCell::new(None),
            main_content_shown: Cell::new(false),
            radius_readout: Cell::new(None),
            radius_handler: RefCell::new(None),
        }
    }

    pub(crate) fn login_href(&self) -> Option<String> {
        self.login_href.borrow().clone()
    }

    pub(crate) fn main_content_shown(&self) -> bool {
        self.main_content_shown.get()
    }

    pub(crate) fn radius_readout(&self) -> Option<u32> {
        self.radius_readout.get()
    }

    /// Simulate the user moving the radius control.
    ///
    /// # Panics
    ///
    /// If no handler has been registered.
    pub(crate) fn change_radius(&self, radius: u32) -> LocalBoxFuture<'static, ()> {
        let handler = self.radius_handler.borrow();
        let handler = handler.as_ref().expect("radius handler registered");
        handler(radius)
    }
}

impl Page for FakePage {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn show_login(&self, authorization_url: &str) -> Result<(), Error> {
        *self.login_href.borrow_mut() = Some(authorization_url.to_owned());
        Ok(())
    }

    fn show_main_content(&self) -> Result<(), Error> {
        self.main_content_shown.set(true);
        Ok(())
    }

    fn set_radius_readout(&self, radius: u32) -> Result<(), Error> {
        self.radius_readout.set(Some(radius));
        Ok(())
    }

    fn on_radius_change(&self, handler: RadiusHandler) -> Result<(), Error> {
        *self.radius_handler.borrow_mut() = Some(handler);
        Ok(())
    }
}
