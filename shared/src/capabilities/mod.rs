mod back_handler;
mod geolocation;
mod photo_library;

pub use self::back_handler::{BackHandler, BackHandlerOperation};
pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, GeolocationOutput, GeolocationResult,
    LocationPermission, PermissionStatus, Position, PositionOptions,
};
pub use self::photo_library::{
    PhotoLibrary, PhotoLibraryError, PhotoLibraryOperation, PhotoLibraryResult, PhotoPage,
};

// Crux's built-in Render covers view updates as is.
pub use crux_core::render::{Render, RenderOperation};

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "crate::App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub geolocation: Geolocation<Event>,
    pub photo_library: PhotoLibrary<Event>,
    pub back_handler: BackHandler<Event>,
}
