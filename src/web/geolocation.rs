use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{GeolocationPosition, GeolocationPositionError, Window};

use super::describe;
use crate::error::Error;
use crate::location::LocationProvider;
use crate::venue::Coordinates;

type PositionSender = Rc<RefCell<Option<oneshot::Sender<Result<Coordinates, Error>>>>>;

/// [`LocationProvider`] backed by `navigator.geolocation.getCurrentPosition`.
pub struct BrowserGeolocation {
    window: Window,
}

impl BrowserGeolocation {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

fn resolve(sender: &PositionSender, result: Result<Coordinates, Error>) {
    if let Some(tx) = sender.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

impl LocationProvider for BrowserGeolocation {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        let geolocation = self
            .window
            .navigator()
            .geolocation()
            .map_err(|e| Error::Geolocation(describe(&e)))?;

        let (tx, rx) = oneshot::channel();
        let sender: PositionSender = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let sender = Rc::clone(&sender);
            Closure::once(move |position: GeolocationPosition| {
                let coords = position.coords();
                resolve(
                    &sender,
                    Ok(Coordinates::new(coords.latitude(), coords.longitude())),
                );
            })
        };
        let on_error = {
            let sender = Rc::clone(&sender);
            Closure::once(move |error: GeolocationPositionError| {
                resolve(&sender, Err(Error::Geolocation(error.message())));
            })
        };

        geolocation
            .get_current_position_with_error_callback(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
            );

        // Both closures have to outlive the browser's callback.
        let result = rx
            .await
            .map_err(|_| Error::Geolocation("position request dropped".into()))?;
        drop((on_success, on_error));
        result
    }
}
