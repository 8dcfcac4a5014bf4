use time::OffsetDateTime;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlDocument};

use super::describe;
use crate::cookies::{CredentialStore, cookie_line, find_cookie};
use crate::error::Error;

/// [`CredentialStore`] backed by `document.cookie`.
pub struct DocumentCookies {
    document: HtmlDocument,
}

impl DocumentCookies {
    /// # Errors
    ///
    /// Returns [`Error::Dom`] if `document` is not an HTML document.
    pub fn new(document: &Document) -> Result<Self, Error> {
        let document = document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| Error::Dom("document has no cookie jar".into()))?;
        Ok(Self { document })
    }
}

impl CredentialStore for DocumentCookies {
    fn read(&self, name: &str) -> Option<String> {
        let header = self.document.cookie().ok()?;
        find_cookie(&header, name)
    }

    fn write(&self, name: &str, value: &str, days: Option<u32>) -> Result<(), Error> {
        self.document
            .set_cookie(&cookie_line(name, value, days, OffsetDateTime::now_utc()))
            .map_err(|e| Error::Dom(format!("cookie write failed: {}", describe(&e))))
    }
}
