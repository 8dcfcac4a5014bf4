use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlScriptElement, Window};

use super::describe;
use crate::error::Error;
use crate::map::{MapSettings, MapWidget, MarkerSpec};
use crate::url_params;
use crate::venue::Coordinates;

const MAPS_SCRIPT_URL: &str = "//maps.googleapis.com/maps/api/js";

mod bindings {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Clone)]
        pub type Map;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(container: &web_sys::Element, options: &JsValue) -> Map;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Clone)]
        pub type Marker;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(options: &JsValue) -> Marker;

        #[wasm_bindgen(method, js_name = setMap)]
        pub fn set_map(this: &Marker, map: Option<&Map>);

        #[wasm_bindgen(method, js_name = addListener)]
        pub fn add_listener(this: &Marker, event: &str, handler: &js_sys::Function) -> JsValue;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Clone)]
        pub type InfoWindow;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new() -> InfoWindow;

        #[wasm_bindgen(method, js_name = setContent)]
        pub fn set_content(this: &InfoWindow, content: &web_sys::Node);

        #[wasm_bindgen(method)]
        pub fn open(this: &InfoWindow, map: &Map, anchor: &Marker);
    }
}

/// A marker on the map together with its click listener.
pub struct PlacedMarker {
    marker: bindings::Marker,
    _on_click: Closure<dyn FnMut()>,
}

struct Loaded {
    map: bindings::Map,
    info_window: bindings::InfoWindow,
}

/// [`MapWidget`] backed by the Google Maps JavaScript API.
///
/// The API script is injected on [`load`](MapWidget::load) with a global
/// callback named after the configured `maps_callback`.
pub struct GoogleMaps {
    window: Window,
    document: Document,
    api_key: String,
    callback_name: String,
    loaded: RefCell<Option<Loaded>>,
}

impl GoogleMaps {
    #[must_use]
    pub fn new(
        window: Window,
        document: Document,
        api_key: impl Into<String>,
        callback_name: impl Into<String>,
    ) -> Self {
        Self {
            window,
            document,
            api_key: api_key.into(),
            callback_name: callback_name.into(),
            loaded: RefCell::new(None),
        }
    }

    fn script_url(&self) -> String {
        url_params::append_params(
            MAPS_SCRIPT_URL,
            [
                ("callback", self.callback_name.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
    }

    /// `<div class="marker-content"><h1>name</h1><p class="marker-content__address">address</p></div>`
    fn popup_content(document: &Document, spec: &MarkerSpec) -> Result<Element, JsValue> {
        let content = document.create_element("div")?;
        content.set_class_name("marker-content");

        let title = document.create_element("h1")?;
        title.set_text_content(Some(&spec.name));
        content.append_child(&title)?;

        let address = document.create_element("p")?;
        address.set_class_name("marker-content__address");
        address.set_text_content(Some(&spec.address));
        content.append_child(&address)?;

        Ok(content)
    }
}

type LoadSender = Rc<RefCell<Option<oneshot::Sender<Result<(), Error>>>>>;

fn resolve(sender: &LoadSender, result: Result<(), Error>) {
    if let Some(tx) = sender.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), Error> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| Error::Widget(describe(&e)))
}

fn lat_lng(position: Coordinates) -> Result<JsValue, Error> {
    let value: JsValue = Object::new().into();
    set(&value, "lat", &position.latitude.into())?;
    set(&value, "lng", &position.longitude.into())?;
    Ok(value)
}

fn dom_error(e: JsValue) -> Error {
    Error::Dom(describe(&e))
}

impl MapWidget for GoogleMaps {
    type Marker = PlacedMarker;

    async fn load(&self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();
        let sender: LoadSender = Rc::new(RefCell::new(Some(tx)));

        let on_ready = {
            let sender = Rc::clone(&sender);
            Closure::<dyn FnMut()>::new(move || resolve(&sender, Ok(())))
        };
        let on_error = {
            let sender = Rc::clone(&sender);
            Closure::<dyn FnMut()>::new(move || {
                resolve(
                    &sender,
                    Err(Error::Widget("Google Maps script failed to load".into())),
                );
            })
        };
        set(&self.window, &self.callback_name, on_ready.as_ref())?;

        let script = self
            .document
            .create_element("script")
            .map_err(dom_error)?
            .dyn_into::<HtmlScriptElement>()
            .map_err(|_| Error::Dom("not a script element".into()))?;
        script.set_src(&self.script_url());
        script.set_async(true);
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Dom("document has no body".into()))?;
        body.append_child(&script).map_err(dom_error)?;
        tracing::debug!(callback = %self.callback_name, "Google Maps script injected");

        let result = rx
            .await
            .map_err(|_| Error::Widget("Google Maps load was cancelled".into()));
        script.set_onerror(None);
        let _ = Reflect::delete_property(self.window.as_ref(), &JsValue::from_str(&self.callback_name));
        drop((on_ready, on_error));
        result?
    }

    fn create_map(&self, settings: &MapSettings) -> Result<(), Error> {
        let container = self
            .document
            .query_selector(&settings.container)
            .map_err(dom_error)?
            .ok_or_else(|| Error::Dom(format!("missing element {}", settings.container)))?;

        let options: JsValue = Object::new().into();
        set(&options, "center", &lat_lng(settings.center)?)?;
        set(&options, "zoom", &settings.zoom.into())?;
        set(&options, "mapTypeId", &JsValue::from_str(&settings.map_type))?;
        set(&options, "fullscreenControl", &settings.fullscreen_control.into())?;
        set(&options, "mapTypeControl", &settings.map_type_control.into())?;
        set(&options, "scrollwheel", &settings.scrollwheel.into())?;
        set(&options, "streetViewControl", &settings.street_view_control.into())?;

        let map = bindings::Map::new(&container, &options);
        let info_window = bindings::InfoWindow::new();
        *self.loaded.borrow_mut() = Some(Loaded { map, info_window });
        Ok(())
    }

    fn add_marker(&self, spec: &MarkerSpec) -> Result<PlacedMarker, Error> {
        let loaded = self.loaded.borrow();
        let Loaded { map, info_window } = loaded
            .as_ref()
            .ok_or_else(|| Error::Widget("map has not been created".into()))?;

        let options: JsValue = Object::new().into();
        set(&options, "map", map.as_ref())?;
        set(&options, "position", &lat_lng(spec.position)?)?;
        set(&options, "title", &JsValue::from_str(&spec.name))?;
        let marker = bindings::Marker::new(&options);

        let on_click = {
            let document = self.document.clone();
            let map = map.clone();
            let info_window = info_window.clone();
            let anchor = marker.clone();
            let spec = spec.clone();
            Closure::<dyn FnMut()>::new(move || {
                match Self::popup_content(&document, &spec) {
                    Ok(content) => {
                        info_window.set_content(&content);
                        info_window.open(&map, &anchor);
                    }
                    Err(e) => tracing::warn!(error = %describe(&e), "Marker popup failed"),
                }
            })
        };
        marker.add_listener("click", on_click.as_ref().unchecked_ref());

        Ok(PlacedMarker {
            marker,
            _on_click: on_click,
        })
    }

    fn remove_marker(&self, placed: PlacedMarker) {
        placed.marker.set_map(None);
    }
}
