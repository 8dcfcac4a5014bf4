use std::future::Future;

use crate::error::Error;
use crate::venue::Coordinates;

/// One-shot source of the user's position.
///
/// The browser implementation wraps `navigator.geolocation`. A denied
/// permission or a missing capability resolves to [`Error::Geolocation`].
pub trait LocationProvider {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, Error>>;
}

/// Provider that always reports the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        Ok(self.0)
    }
}
