use futures::future::LocalBoxFuture;

use crate::error::Error;

/// Called with the newly selected radius whenever the radius control changes.
pub type RadiusHandler = Box<dyn Fn(u32) -> LocalBoxFuture<'static, ()>>;

/// The page elements the service drives.
///
/// The browser implementation looks elements up by their `.js-*` classes.
pub trait Page {
    /// Current location, including any fragment.
    fn href(&self) -> String;

    /// Reveal the login block with its button pointing at `authorization_url`.
    fn show_login(&self, authorization_url: &str) -> Result<(), Error>;

    /// Un-hide the main content once the user is authenticated.
    fn show_main_content(&self) -> Result<(), Error>;

    /// Update the numeric readout next to the radius control.
    fn set_radius_readout(&self, radius: u32) -> Result<(), Error>;

    /// Run `handler` on every radius change. The page is responsible for
    /// driving the returned future to completion.
    fn on_radius_change(&self, handler: RadiusHandler) -> Result<(), Error>;
}
