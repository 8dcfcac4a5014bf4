use std::cell::RefCell;

use cookie::Cookie;
use time::{Duration, OffsetDateTime};

use crate::error::Error;

/// Name of the cookie holding the Foursquare access token.
pub const TOKEN_COOKIE_NAME: &str = "foursquare";

/// Persistent name/value storage for the access token.
///
/// Browser-side this is `document.cookie`; natively and in tests it is
/// [`MemoryCookies`].
pub trait CredentialStore {
    /// Look up a stored value by its decoded name. `None` when absent.
    fn read(&self, name: &str) -> Option<String>;

    /// Store a value for `days` days, or for the session when `days` is
    /// `None` or zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dom`] if the underlying store rejects the write.
    fn write(&self, name: &str, value: &str, days: Option<u32>) -> Result<(), Error>;
}

/// Render a `document.cookie` assignment for `name=value`.
///
/// Name and value are percent-encoded. A positive `days` adds an `Expires`
/// attribute relative to `now`; otherwise the cookie lives for the session.
#[must_use]
pub fn cookie_line(name: &str, value: &str, days: Option<u32>, now: OffsetDateTime) -> String {
    let mut builder = Cookie::build((name.to_owned(), value.to_owned())).path("/");
    if let Some(days) = days.filter(|d| *d > 0) {
        builder = builder.expires(now + Duration::days(i64::from(days)));
    }
    builder.build().encoded().to_string()
}

/// Find `name` in a `document.cookie` style header (`a=1; b=2`).
///
/// Separator whitespace between entries is skipped and both names and values
/// are percent-decoded. Malformed entries are ignored.
#[must_use]
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse_encoded(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}

/// In-memory cookie jar that behaves like `document.cookie`.
///
/// Writes go through [`cookie_line`] and reads through [`find_cookie`], so the
/// same encoding rules apply as in the browser.
#[derive(Debug, Default)]
pub struct MemoryCookies {
    jar: RefCell<Vec<Cookie<'static>>>,
}

impl MemoryCookies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a raw cookie assignment, the way `document.cookie = line` does.
    ///
    /// A cookie whose expiry is already in the past removes any stored entry
    /// with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dom`] if `line` is not a valid cookie.
    pub fn set_cookie_line(&self, line: &str) -> Result<(), Error> {
        let cookie = Cookie::parse_encoded(line.to_owned())
            .map_err(|e| Error::Dom(format!("invalid cookie: {e}")))?;

        let mut jar = self.jar.borrow_mut();
        jar.retain(|c| c.name() != cookie.name());
        if !is_expired(&cookie, OffsetDateTime::now_utc()) {
            jar.push(cookie);
        }
        Ok(())
    }

    /// Current header as `document.cookie` would return it.
    #[must_use]
    pub fn header(&self) -> String {
        let now = OffsetDateTime::now_utc();
        self.jar
            .borrow()
            .iter()
            .filter(|c| !is_expired(c, now))
            .map(|c| c.encoded().stripped().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CredentialStore for MemoryCookies {
    fn read(&self, name: &str) -> Option<String> {
        find_cookie(&self.header(), name)
    }

    fn write(&self, name: &str, value: &str, days: Option<u32>) -> Result<(), Error> {
        self.set_cookie_line(&cookie_line(name, value, days, OffsetDateTime::now_utc()))
    }
}

fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
}
