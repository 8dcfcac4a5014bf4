//! Browser bindings for the venue map.
//!
//! Only compiled for `wasm32`. Implements the capability traits on top of
//! `document.cookie`, `navigator.geolocation`, the Google Maps JavaScript API
//! and the page's `.js-*` elements, and exports [`start`] to JavaScript.
//!
//! # Quick Start
//!
//! ```html
//! <script type="module">
//!   import init, { start } from "./venue_map.js";
//!   await init();
//!   start(JSON.stringify({
//!     client_id: "FOURSQUARE_CLIENT_ID",
//!     redirect_uri: "https://venues.example.com/",
//!     maps_api_key: "GOOGLE_MAPS_KEY",
//!     token_ttl_days: 30,
//!   }));
//! </script>
//! ```

mod bootstrap;
mod cookies;
mod geolocation;
mod google_maps;
mod page;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub use bootstrap::when_content_loaded;
pub use cookies::DocumentCookies;
pub use geolocation::BrowserGeolocation;
pub use google_maps::GoogleMaps;
pub use page::DomPage;

use crate::config::VenueMapConfig;
use crate::error::Error;
use crate::http::ReqwestTransport;
use crate::service::{SessionState, VenueService};

type BrowserService =
    VenueService<DocumentCookies, BrowserGeolocation, ReqwestTransport, GoogleMaps, DomPage>;

static LOGGING: OnceLock<()> = OnceLock::new();

thread_local! {
    // Page event handlers only hold weak references; this keeps the session alive.
    static SESSION: RefCell<Option<Rc<BrowserService>>> = const { RefCell::new(None) };
}

/// Entry point called by the page with its JSON configuration.
///
/// Parses the configuration right away, then starts the venue service once
/// the document has finished loading.
///
/// # Errors
///
/// Throws if the configuration is invalid or there is no `window`/`document`.
#[wasm_bindgen]
pub fn start(config_json: &str) -> Result<(), JsValue> {
    init_logging();

    let config = VenueMapConfig::from_json(config_json)?;
    let window = web_sys::window().ok_or_else(|| Error::Dom("window missing".into()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Dom("document missing".into()))?;

    when_content_loaded(&document, move || {
        spawn_local(async move {
            match run(config).await {
                Ok(state) => tracing::debug!(?state, "Venue map started"),
                Err(e) => tracing::error!(error = %e, "Venue map failed"),
            }
        });
    })?;
    Ok(())
}

async fn run(config: VenueMapConfig) -> Result<SessionState, Error> {
    let window = web_sys::window().ok_or_else(|| Error::Dom("window missing".into()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Dom("document missing".into()))?;

    let widget = GoogleMaps::new(
        window.clone(),
        document.clone(),
        config.maps_api_key(),
        config.maps_callback(),
    );
    let service: Rc<BrowserService> = Rc::new(VenueService::new(
        config,
        DocumentCookies::new(&document)?,
        BrowserGeolocation::new(window.clone()),
        ReqwestTransport::new(),
        widget,
        DomPage::new(window, document),
    ));
    SESSION.with(|session| *session.borrow_mut() = Some(Rc::clone(&service)));

    service.init().await
}

fn init_logging() {
    LOGGING.get_or_init(|| {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        tracing_wasm::set_as_global_default();
    });
}

/// Readable text for a JavaScript exception or value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl From<Error> for JsValue {
    fn from(e: Error) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
