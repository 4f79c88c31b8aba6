use crate::capabilities::{GeolocationError, PermissionStatus, PhotoLibraryResult, Position};
use crate::model::{MessageId, SessionToken};
use crate::ScreenConfig;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub enum Event {
    #[default]
    Noop,

    Configure(ScreenConfig),
    ScreenMounted,
    ScreenUnmounted,
    ConnectivityChanged {
        connected: bool,
    },

    MessagePressed {
        id: MessageId,
    },
    DeleteConfirmed,
    DialogDismissed,

    DraftChanged {
        text: String,
    },
    TextSubmitted {
        text: String,
    },
    FocusChanged {
        focused: bool,
    },
    CameraPressed,
    LocationPressed,

    ImagePicked {
        uri: String,
    },
    ImageGridEndReached,

    FullscreenImageDismissed,
    FullscreenLocationDismissed,
    BackPressed,

    // Capability resolutions. Each carries the session that issued it.
    LocationPermissionResolved {
        session: SessionToken,
        result: Result<PermissionStatus, GeolocationError>,
    },
    PositionResolved {
        session: SessionToken,
        result: Result<Position, GeolocationError>,
    },
    PhotosLoaded {
        session: SessionToken,
        result: PhotoLibraryResult,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::ScreenMounted => "screen_mounted",
            Self::ScreenUnmounted => "screen_unmounted",
            Self::ConnectivityChanged { .. } => "connectivity_changed",
            Self::MessagePressed { .. } => "message_pressed",
            Self::DeleteConfirmed => "delete_confirmed",
            Self::DialogDismissed => "dialog_dismissed",
            Self::DraftChanged { .. } => "draft_changed",
            Self::TextSubmitted { .. } => "text_submitted",
            Self::FocusChanged { .. } => "focus_changed",
            Self::CameraPressed => "camera_pressed",
            Self::LocationPressed => "location_pressed",
            Self::ImagePicked { .. } => "image_picked",
            Self::ImageGridEndReached => "image_grid_end_reached",
            Self::FullscreenImageDismissed => "fullscreen_image_dismissed",
            Self::FullscreenLocationDismissed => "fullscreen_location_dismissed",
            Self::BackPressed => "back_pressed",
            Self::LocationPermissionResolved { .. } => "location_permission_resolved",
            Self::PositionResolved { .. } => "position_resolved",
            Self::PhotosLoaded { .. } => "photos_loaded",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::MessagePressed { .. }
                | Self::DeleteConfirmed
                | Self::DialogDismissed
                | Self::TextSubmitted { .. }
                | Self::CameraPressed
                | Self::LocationPressed
                | Self::ImagePicked { .. }
                | Self::FullscreenImageDismissed
                | Self::FullscreenLocationDismissed
                | Self::BackPressed
        )
    }

    #[must_use]
    pub const fn session(&self) -> Option<SessionToken> {
        match self {
            Self::LocationPermissionResolved { session, .. }
            | Self::PositionResolved { session, .. }
            | Self::PhotosLoaded { session, .. } => Some(*session),
            _ => None,
        }
    }
}
