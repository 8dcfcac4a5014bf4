use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement, Window};

use super::describe;
use crate::error::Error;
use crate::page::{Page, RadiusHandler};

const LOGIN: &str = ".js-login";
const LOGIN_BUTTON: &str = ".js-login-button";
const MAIN_CONTENT: &str = ".js-main-content";
const RADIUS_INPUT: &str = ".js-max-range";
const RADIUS_READOUT: &str = ".js-max-range-indicator";

/// [`Page`] over the document's `.js-*` elements.
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    #[must_use]
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn element(&self, selector: &str) -> Result<Element, Error> {
        self.document
            .query_selector(selector)
            .map_err(|e| Error::Dom(describe(&e)))?
            .ok_or_else(|| Error::Dom(format!("missing element {selector}")))
    }
}

fn dom_error(e: JsValue) -> Error {
    Error::Dom(describe(&e))
}

impl Page for DomPage {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn show_login(&self, authorization_url: &str) -> Result<(), Error> {
        let login = self.element(LOGIN)?;
        let button = login
            .query_selector(LOGIN_BUTTON)
            .map_err(dom_error)?
            .ok_or_else(|| Error::Dom(format!("missing element {LOGIN_BUTTON}")))?;

        login.remove_attribute("hidden").map_err(dom_error)?;
        button
            .set_attribute("href", authorization_url)
            .map_err(dom_error)
    }

    fn show_main_content(&self) -> Result<(), Error> {
        self.element(MAIN_CONTENT)?
            .remove_attribute("hidden")
            .map_err(dom_error)
    }

    fn set_radius_readout(&self, radius: u32) -> Result<(), Error> {
        self.element(RADIUS_READOUT)?
            .set_text_content(Some(&radius.to_string()));
        Ok(())
    }

    fn on_radius_change(&self, handler: RadiusHandler) -> Result<(), Error> {
        let input = self
            .element(RADIUS_INPUT)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| Error::Dom(format!("{RADIUS_INPUT} is not an input")))?;

        let source = input.clone();
        let on_change = Closure::<dyn FnMut()>::new(move || {
            let value = source.value();
            match value.trim().parse::<u32>() {
                Ok(radius) => spawn_local(handler(radius)),
                Err(e) => tracing::warn!(value = %value, error = %e, "Ignoring invalid radius"),
            }
        });
        input
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(dom_error)?;

        // Listener lives as long as the page.
        on_change.forget();
        Ok(())
    }
}
