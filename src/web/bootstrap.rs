use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use super::describe;
use crate::error::Error;

/// Run `f` once the document's content has been parsed.
///
/// The wasm module usually finishes loading after `DOMContentLoaded` has
/// already fired; in that case `f` runs immediately.
///
/// # Errors
///
/// Returns [`Error::Dom`] if the event listener cannot be registered.
pub fn when_content_loaded<F>(document: &Document, f: F) -> Result<(), Error>
where
    F: FnOnce() + 'static,
{
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }

    let callback = Closure::once_into_js(f);
    document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        .map_err(|e| Error::Dom(describe(&e)))
}
