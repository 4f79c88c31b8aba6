#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod event;
pub mod model;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{
    Coordinate, Dialog, ImageUri, Message, MessageContent, MessageId, MessageKind, MessageStore,
    Model, SessionToken,
};

use capabilities::{GeolocationError, LocationPermission, PhotoLibraryError, PositionOptions};

pub const MAP_LATITUDE_DELTA: f64 = 0.08;
pub const MAP_LONGITUDE_DELTA: f64 = 0.04;
pub const MAX_MAP_DELTA: f64 = 180.0;
pub const PHOTO_PAGE_SIZE: u32 = 20;
pub const MAX_PHOTO_PAGE_SIZE: u32 = 100;
pub const IMAGE_GRID_COLUMNS: u8 = 4;
pub const MAX_IMAGE_GRID_COLUMNS: u8 = 8;

pub const SEED_IMAGE_URI: &str = "https://picsum.photos";
pub const SEED_LOCATION: (f64, f64) = (16.078_570_199_999_998, 108.148_249_499_999_99);

pub const DELETE_DIALOG_TITLE: &str = "Delete message?";
pub const DELETE_DIALOG_MESSAGE: &str =
    "Are you sure you want to permanently delete this message?";
pub const ALERT_TITLE: &str = "Alert";
pub const LOCATION_UNAVAILABLE_MESSAGE: &str = "You didn't turn on location";
pub const NO_CONNECTION_BANNER: &str = "No network connection";
pub const CLOSE_LABEL: &str = "Close";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    LocationUnavailable,
    LocationPermissionDenied,
    PhotoLibrary,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::LocationUnavailable => "LOCATION_UNAVAILABLE",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::PhotoLibrary => "PHOTO_LIBRARY_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Text shown to the user. Location failures always use the same fixed
    /// alert, whatever the platform reported.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::LocationUnavailable | ErrorKind::LocationPermissionDenied => {
                LOCATION_UNAVAILABLE_MESSAGE.into()
            }
            ErrorKind::Validation | ErrorKind::PhotoLibrary => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

impl From<CoordinateError> for AppError {
    fn from(e: CoordinateError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageUriError {
    #[error("Image URI is empty")]
    Empty,
    #[error("Image URI {uri:?} is invalid: {reason}")]
    Invalid { uri: String, reason: String },
}

impl From<ImageUriError> for AppError {
    fn from(e: ImageUriError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<GeolocationError> for AppError {
    fn from(e: GeolocationError) -> Self {
        let kind = if e.is_permission_error() {
            ErrorKind::LocationPermissionDenied
        } else {
            ErrorKind::LocationUnavailable
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<PhotoLibraryError> for AppError {
    fn from(e: PhotoLibraryError) -> Self {
        AppError::new(ErrorKind::PhotoLibrary, e.to_string())
    }
}

/// Screen settings the shell may override. Unknown or missing fields fall
/// back to the defaults; out-of-range values are clamped by `validated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub seed_conversation: bool,
    pub photo_page_size: u32,
    pub image_grid_columns: u8,
    pub map_latitude_delta: f64,
    pub map_longitude_delta: f64,
    pub location_permission: LocationPermission,
    pub position_options: PositionOptions,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            seed_conversation: true,
            photo_page_size: PHOTO_PAGE_SIZE,
            image_grid_columns: IMAGE_GRID_COLUMNS,
            map_latitude_delta: MAP_LATITUDE_DELTA,
            map_longitude_delta: MAP_LONGITUDE_DELTA,
            location_permission: LocationPermission::default(),
            position_options: PositionOptions::default(),
        }
    }
}

impl ScreenConfig {
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.photo_page_size = self.photo_page_size.clamp(1, MAX_PHOTO_PAGE_SIZE);
        self.image_grid_columns = self.image_grid_columns.clamp(1, MAX_IMAGE_GRID_COLUMNS);
        self.map_latitude_delta = valid_delta(self.map_latitude_delta, MAP_LATITUDE_DELTA);
        self.map_longitude_delta = valid_delta(self.map_longitude_delta, MAP_LONGITUDE_DELTA);
        self
    }
}

fn valid_delta(delta: f64, fallback: f64) -> f64 {
    if delta.is_finite() && delta > 0.0 {
        delta.min(MAX_MAP_DELTA)
    } else {
        fallback
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinate> for MarkerView {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude(),
            longitude: c.longitude(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    #[must_use]
    pub fn around(coordinate: Coordinate, config: &ScreenConfig) -> Self {
        Self {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            latitude_delta: config.map_latitude_delta,
            longitude_delta: config.map_longitude_delta,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBodyView {
    Text { body: String },
    Image { uri: String },
    Location { region: MapRegion, marker: MarkerView },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageView {
    pub id: u64,
    pub kind: MessageKind,
    pub body: MessageBodyView,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolbarView {
    pub is_focused: bool,
    pub draft: String,
    pub can_submit: bool,
    pub is_locating: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageGridView {
    pub columns: u8,
    pub images: Vec<String>,
    pub is_loading: bool,
    pub has_more: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullscreenImageView {
    pub message_id: u64,
    pub uri: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FullscreenLocationView {
    pub message_id: u64,
    pub region: MapRegion,
    pub marker: MarkerView,
    pub close_label: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogButtonStyle {
    Default,
    Cancel,
    Destructive,
}

/// What the shell sends back when a dialog button is tapped.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogAction {
    ConfirmDelete,
    Dismiss,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogButtonView {
    pub label: String,
    pub style: DialogButtonStyle,
    pub action: DialogAction,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogView {
    pub title: String,
    pub message: String,
    pub buttons: Vec<DialogButtonView>,
}

impl DialogView {
    #[must_use]
    pub fn for_dialog(dialog: &Dialog) -> Self {
        match dialog {
            Dialog::ConfirmDelete { .. } => Self {
                title: DELETE_DIALOG_TITLE.into(),
                message: DELETE_DIALOG_MESSAGE.into(),
                buttons: vec![
                    DialogButtonView {
                        label: "Cancel".into(),
                        style: DialogButtonStyle::Cancel,
                        action: DialogAction::Dismiss,
                    },
                    DialogButtonView {
                        label: "Delete".into(),
                        style: DialogButtonStyle::Destructive,
                        action: DialogAction::ConfirmDelete,
                    },
                ],
            },
            Dialog::LocationUnavailable => Self {
                title: ALERT_TITLE.into(),
                message: AppError::new(ErrorKind::LocationUnavailable, "")
                    .user_facing_message(),
                buttons: vec![DialogButtonView {
                    label: "OK".into(),
                    style: DialogButtonStyle::Default,
                    action: DialogAction::Dismiss,
                }],
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusView {
    pub connected: bool,
    pub banner: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub status: StatusView,
    pub messages: Vec<MessageView>,
    pub toolbar: ToolbarView,
    pub image_grid: ImageGridView,
    pub fullscreen_image: Option<FullscreenImageView>,
    pub fullscreen_location: Option<FullscreenLocationView>,
    pub dialog: Option<DialogView>,
    /// Whether a back press would be consumed by the screen.
    pub intercepts_back: bool,
}

pub mod app {
    use super::*;
    use crate::capabilities::{GeolocationError, PermissionStatus, PhotoLibraryResult, Position};
    use crate::model::Selection;
    use tracing::{debug, error, info, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn request_position(model: &Model, caps: &Capabilities, session: SessionToken) {
            caps.geolocation
                .get_current_position(model.config.position_options, move |result| {
                    Event::PositionResolved { session, result }
                });
        }

        fn load_photos(model: &mut Model, caps: &Capabilities, after: Option<String>) {
            let session = model.lifecycle.session();
            model.image_grid.is_loading = true;
            debug!(session = session.0, cursor = ?after, "loading photo page");
            caps.photo_library
                .get_photos(model.config.photo_page_size, after, move |result| {
                    Event::PhotosLoaded { session, result }
                });
        }

        fn finish_location_request(model: &mut Model) {
            model.location_requests_in_flight = model.location_requests_in_flight.saturating_sub(1);
        }

        fn handle_permission(
            result: Result<PermissionStatus, GeolocationError>,
            session: SessionToken,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            match result {
                Ok(status) if status.is_granted() => {
                    info!(session = session.0, "location permission granted");
                    Self::request_position(model, caps, session);
                }
                Ok(status) => {
                    warn!(session = session.0, ?status, "location permission denied");
                    Self::finish_location_request(model);
                }
                Err(e) => {
                    // The position query reports its own failure if the
                    // permission is really missing.
                    warn!(session = session.0, error = %e, "location permission request failed");
                    Self::request_position(model, caps, session);
                }
            }
        }

        fn handle_position(result: Result<Position, GeolocationError>, model: &mut Model) {
            Self::finish_location_request(model);

            let coordinate = result.map_err(AppError::from).and_then(|position| {
                Coordinate::new(position.latitude, position.longitude).map_err(|e| {
                    AppError::from(e)
                        .with_context("latitude", position.latitude.to_string())
                        .with_context("longitude", position.longitude.to_string())
                })
            });

            match coordinate {
                Ok(coordinate) => {
                    let id = model.messages.prepend(MessageContent::location(coordinate));
                    info!(message_id = id.get(), "location message created");
                }
                Err(e) => {
                    warn!(code = e.code(), error = %e, "location fetch failed");
                    model.dialogs.enqueue(Dialog::LocationUnavailable);
                }
            }
        }

        fn handle_photos(result: PhotoLibraryResult, model: &mut Model) {
            let grid = &mut model.image_grid;
            grid.is_loading = false;
            grid.has_loaded_once = true;

            match result {
                Ok(page) => {
                    grid.cursor = page.next_cursor();
                    let before = grid.images.len();
                    for raw in page.uris {
                        match ImageUri::parse(raw) {
                            Ok(uri) => grid.images.push(uri),
                            Err(e) => warn!(error = %e, "skipping photo with invalid uri"),
                        }
                    }
                    debug!(
                        added = grid.images.len() - before,
                        has_more = grid.cursor.is_some(),
                        "photo page loaded"
                    );
                }
                Err(e) => {
                    grid.cursor = None;
                    let e = AppError::from(e);
                    warn!(code = e.code(), error = %e, "photo library unavailable");
                }
            }
        }

        fn handle_message_pressed(id: MessageId, model: &mut Model) -> bool {
            if model.dialogs.is_blocking() {
                debug!(message_id = id.get(), "ignoring press behind dialog");
                return false;
            }

            let Some(message) = model.messages.get(id) else {
                debug!(message_id = id.get(), "pressed message no longer exists");
                return false;
            };

            match message.kind() {
                MessageKind::Text => {
                    model.dialogs.enqueue(Dialog::ConfirmDelete { message_id: id });
                }
                MessageKind::Image => {
                    model.selection.fullscreen_image_id = Some(id);
                    model.toolbar.is_focused = false;
                }
                MessageKind::Location => {
                    model.selection.fullscreen_location_id = Some(id);
                    model.toolbar.is_focused = false;
                }
            }
            true
        }

        fn handle_back(model: &mut Model, caps: &Capabilities) -> bool {
            if !model.lifecycle.back_subscribed {
                caps.back_handler.fall_through();
                return false;
            }

            let Selection {
                fullscreen_image_id,
                fullscreen_location_id,
            } = model.selection;

            if model.selection.open_image(&model.messages).is_some() {
                model.selection.fullscreen_image_id = None;
                debug!(message_id = ?fullscreen_image_id, "back dismissed image overlay");
                true
            } else if model.selection.open_location(&model.messages).is_some() {
                model.selection.fullscreen_location_id = None;
                debug!(message_id = ?fullscreen_location_id, "back dismissed location overlay");
                true
            } else {
                caps.back_handler.fall_through();
                false
            }
        }

        fn build_message_views(model: &Model) -> Vec<MessageView> {
            model
                .messages
                .list()
                .iter()
                .map(|message| {
                    let body = match message.content() {
                        MessageContent::Text { body } => MessageBodyView::Text { body: body.clone() },
                        MessageContent::Image { uri } => MessageBodyView::Image {
                            uri: uri.to_string(),
                        },
                        MessageContent::Location { coordinate } => MessageBodyView::Location {
                            region: MapRegion::around(*coordinate, &model.config),
                            marker: MarkerView::from(*coordinate),
                        },
                    };
                    MessageView {
                        id: message.id().get(),
                        kind: message.kind(),
                        body,
                    }
                })
                .collect()
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            if event.is_user_initiated() {
                info!(event = event_name, "user action");
            } else {
                debug!(event = event_name, "event");
            }

            if let Some(session) = event.session() {
                if !model.lifecycle.is_live(session) {
                    debug!(
                        event = event_name,
                        session = session.0,
                        current = model.lifecycle.session().0,
                        "discarding result for a screen that is gone"
                    );
                    return;
                }
            }

            match event {
                Event::Noop => {}

                Event::Configure(config) => {
                    model.config = config.validated();
                    caps.render.render();
                }

                Event::ScreenMounted => {
                    if model.lifecycle.mounted {
                        debug!("screen already mounted");
                        return;
                    }
                    model.lifecycle.mounted = true;
                    let session = model.lifecycle.begin_session();
                    model.location_requests_in_flight = 0;

                    caps.back_handler.subscribe();
                    model.lifecycle.back_subscribed = true;

                    if model.image_grid.can_load_first_page() {
                        Self::load_photos(model, caps, None);
                    }

                    info!(session = session.0, "screen mounted");
                    caps.render.render();
                }

                Event::ScreenUnmounted => {
                    if !model.lifecycle.mounted {
                        debug!("screen already unmounted");
                        return;
                    }
                    if model.lifecycle.back_subscribed {
                        caps.back_handler.unsubscribe();
                        model.lifecycle.back_subscribed = false;
                    }
                    model.lifecycle.mounted = false;
                    let session = model.lifecycle.begin_session();

                    model.location_requests_in_flight = 0;
                    model.image_grid.is_loading = false;

                    info!(session = session.0, "screen unmounted");
                }

                Event::ConnectivityChanged { connected } => {
                    if model.connectivity.connected != connected {
                        info!(connected, "connectivity changed");
                    }
                    model.connectivity.connected = connected;
                    caps.render.render();
                }

                Event::MessagePressed { id } => {
                    if Self::handle_message_pressed(id, model) {
                        caps.render.render();
                    }
                }

                Event::DeleteConfirmed => {
                    if let Some(&Dialog::ConfirmDelete { message_id }) = model.dialogs.current() {
                        model.dialogs.dismiss();
                        if model.messages.remove(message_id).is_some() {
                            info!(message_id = message_id.get(), "message deleted");
                        } else {
                            debug!(message_id = message_id.get(), "message already gone");
                        }
                        caps.render.render();
                    } else {
                        debug!("no delete confirmation pending");
                    }
                }

                Event::DialogDismissed => {
                    if model.dialogs.dismiss().is_some() {
                        caps.render.render();
                    }
                }

                Event::DraftChanged { text } => {
                    model.toolbar.draft = text;
                    caps.render.render();
                }

                Event::TextSubmitted { text } => {
                    if text.is_empty() {
                        debug!("ignoring empty submission");
                        return;
                    }
                    let id = model.messages.prepend(MessageContent::text(text));
                    model.toolbar.draft.clear();
                    info!(message_id = id.get(), "text message created");
                    caps.render.render();
                }

                Event::FocusChanged { focused } => {
                    model.toolbar.is_focused = focused;
                    caps.render.render();
                }

                Event::CameraPressed => {
                    debug!("camera capture is not available on this screen");
                }

                Event::LocationPressed => {
                    if !model.lifecycle.mounted {
                        debug!("ignoring location request while unmounted");
                        return;
                    }
                    let session = model.lifecycle.session();
                    model.location_requests_in_flight += 1;
                    caps.geolocation
                        .request_permission(model.config.location_permission, move |result| {
                            Event::LocationPermissionResolved { session, result }
                        });
                    caps.render.render();
                }

                Event::LocationPermissionResolved { session, result } => {
                    Self::handle_permission(result, session, model, caps);
                    caps.render.render();
                }

                Event::PositionResolved { result, .. } => {
                    Self::handle_position(result, model);
                    caps.render.render();
                }

                Event::ImagePicked { uri } => match ImageUri::parse(uri) {
                    Ok(uri) => {
                        let id = model.messages.prepend(MessageContent::image(uri));
                        info!(message_id = id.get(), "image message created");
                        caps.render.render();
                    }
                    Err(e) => {
                        let e = AppError::from(e);
                        error!(code = e.code(), error = %e, "picked image rejected");
                    }
                },

                Event::ImageGridEndReached => {
                    if model.lifecycle.mounted && model.image_grid.can_load_more() {
                        let cursor = model.image_grid.cursor.clone();
                        Self::load_photos(model, caps, cursor);
                        caps.render.render();
                    }
                }

                Event::PhotosLoaded { result, .. } => {
                    Self::handle_photos(result, model);
                    caps.render.render();
                }

                Event::FullscreenImageDismissed => {
                    model.selection.fullscreen_image_id = None;
                    caps.render.render();
                }

                Event::FullscreenLocationDismissed => {
                    model.selection.fullscreen_location_id = None;
                    caps.render.render();
                }

                Event::BackPressed => {
                    if Self::handle_back(model, caps) {
                        caps.render.render();
                    }
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let fullscreen_image = model.selection.open_image(&model.messages).and_then(|m| {
                m.image_uri().map(|uri| FullscreenImageView {
                    message_id: m.id().get(),
                    uri: uri.to_string(),
                })
            });

            let fullscreen_location =
                model.selection.open_location(&model.messages).and_then(|m| {
                    m.coordinate().map(|coordinate| FullscreenLocationView {
                        message_id: m.id().get(),
                        region: MapRegion::around(coordinate, &model.config),
                        marker: MarkerView::from(coordinate),
                        close_label: CLOSE_LABEL.into(),
                    })
                });

            let grid = &model.image_grid;

            ViewModel {
                status: StatusView {
                    connected: model.connectivity.connected,
                    banner: (!model.connectivity.connected).then(|| NO_CONNECTION_BANNER.into()),
                },
                messages: Self::build_message_views(model),
                toolbar: ToolbarView {
                    is_focused: model.toolbar.is_focused,
                    draft: model.toolbar.draft.clone(),
                    can_submit: !model.toolbar.draft.is_empty(),
                    is_locating: model.location_requests_in_flight > 0,
                },
                image_grid: ImageGridView {
                    columns: model.config.image_grid_columns,
                    images: grid.images.iter().map(|uri| uri.as_str().to_owned()).collect(),
                    is_loading: grid.is_loading,
                    has_more: grid.cursor.is_some(),
                },
                intercepts_back: model.lifecycle.back_subscribed
                    && (fullscreen_image.is_some() || fullscreen_location.is_some()),
                fullscreen_image,
                fullscreen_location,
                dialog: model.dialogs.current().map(DialogView::for_dialog),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_location_errors_share_fixed_message() {
            let timeout = AppError::from(GeolocationError::Timeout);
            assert_eq!(timeout.kind, ErrorKind::LocationUnavailable);
            assert_eq!(timeout.user_facing_message(), LOCATION_UNAVAILABLE_MESSAGE);

            let denied = AppError::from(GeolocationError::PermissionDenied);
            assert_eq!(denied.kind, ErrorKind::LocationPermissionDenied);
            assert_eq!(denied.user_facing_message(), LOCATION_UNAVAILABLE_MESSAGE);
        }

        #[test]
        fn test_coordinate_error_is_validation() {
            let e = AppError::from(CoordinateError::LatitudeOutOfRange(120.0))
                .with_context("latitude", "120");
            assert_eq!(e.code(), "VALIDATION_ERROR");
            assert_eq!(e.context.get("latitude").map(String::as_str), Some("120"));
            assert!(e.to_string().starts_with("[VALIDATION_ERROR]"));
        }

        #[test]
        fn test_photo_library_error_code() {
            let e = AppError::from(PhotoLibraryError::PermissionDenied);
            assert_eq!(e.code(), "PHOTO_LIBRARY_ERROR");
            assert_eq!(e.user_facing_message(), "photo library permission denied");
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults_match_screen() {
            let config = ScreenConfig::default();
            assert!(config.seed_conversation);
            assert_eq!(config.photo_page_size, 20);
            assert_eq!(config.image_grid_columns, 4);
            assert!((config.map_latitude_delta - 0.08).abs() < f64::EPSILON);
            assert!((config.map_longitude_delta - 0.04).abs() < f64::EPSILON);
        }

        #[test]
        fn test_partial_config_keeps_defaults() {
            let config: ScreenConfig =
                serde_json::from_str(r#"{"seed_conversation": false}"#).unwrap();
            assert!(!config.seed_conversation);
            assert_eq!(config.photo_page_size, PHOTO_PAGE_SIZE);
            assert_eq!(config.location_permission, LocationPermission::AccessFineLocation);
        }

        #[test]
        fn test_validated_clamps() {
            let config = ScreenConfig {
                photo_page_size: 0,
                image_grid_columns: 40,
                map_latitude_delta: f64::NAN,
                map_longitude_delta: -1.0,
                ..ScreenConfig::default()
            }
            .validated();
            assert_eq!(config.photo_page_size, 1);
            assert_eq!(config.image_grid_columns, MAX_IMAGE_GRID_COLUMNS);
            assert!((config.map_latitude_delta - MAP_LATITUDE_DELTA).abs() < f64::EPSILON);
            assert!((config.map_longitude_delta - MAP_LONGITUDE_DELTA).abs() < f64::EPSILON);
        }
    }

    mod view_tests {
        use super::*;

        #[test]
        fn test_delete_dialog_buttons() {
            let view = DialogView::for_dialog(&Dialog::ConfirmDelete {
                message_id: MessageId(1),
            });
            assert_eq!(view.title, DELETE_DIALOG_TITLE);
            assert_eq!(view.buttons.len(), 2);
            assert_eq!(view.buttons[0].action, DialogAction::Dismiss);
            assert_eq!(view.buttons[1].style, DialogButtonStyle::Destructive);
        }

        #[test]
        fn test_location_alert_text() {
            let view = DialogView::for_dialog(&Dialog::LocationUnavailable);
            assert_eq!(view.message, LOCATION_UNAVAILABLE_MESSAGE);
            assert_eq!(view.buttons.len(), 1);
        }

        #[test]
        fn test_map_region_uses_config_deltas() {
            let coordinate = Coordinate::new(16.0786, 108.1482).unwrap();
            let region = MapRegion::around(coordinate, &ScreenConfig::default());
            assert!((region.latitude - 16.0786).abs() < f64::EPSILON);
            assert!((region.latitude_delta - MAP_LATITUDE_DELTA).abs() < f64::EPSILON);
            assert!((region.longitude_delta - MAP_LONGITUDE_DELTA).abs() < f64::EPSILON);
        }

        #[test]
        fn test_message_body_serializes_tagged() {
            let body = MessageBodyView::Text { body: "Hi".into() };
            let json = serde_json::to_value(&body).unwrap();
            assert_eq!(json["type"], "text");
            assert_eq!(json["body"], "Hi");
        }
    }
}
