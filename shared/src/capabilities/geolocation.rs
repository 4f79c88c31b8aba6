use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationPermission {
    #[default]
    AccessFineLocation,
    AccessCoarseLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    NeverAskAgain,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Platform defaults apply to every field left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: Option<u64>,
    pub maximum_age_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

impl Position {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum GeolocationOperation {
    RequestPermission { permission: LocationPermission },
    GetCurrentPosition { options: PositionOptions },
}

impl Operation for GeolocationOperation {
    type Output = GeolocationResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {message}")]
    PositionUnavailable { message: String },

    #[error("location request timed out")]
    Timeout,

    #[error("location services are unavailable on this device")]
    ServiceUnavailable,

    #[error("location settings are not satisfied")]
    SettingsNotSatisfied,

    #[error("platform error {code}: {message}")]
    Platform { code: i32, message: String },

    #[error("shell answered with an unexpected output")]
    UnexpectedOutput,
}

impl GeolocationError {
    #[must_use]
    pub const fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GeolocationOutput {
    Permission(PermissionStatus),
    Position(Position),
}

impl GeolocationOutput {
    #[must_use]
    pub const fn permission_status(&self) -> Option<PermissionStatus> {
        match self {
            Self::Permission(status) => Some(*status),
            Self::Position(_) => None,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Position(position) => Some(*position),
            Self::Permission(_) => None,
        }
    }
}

pub type GeolocationResult = Result<GeolocationOutput, GeolocationError>;

/// One-shot device location: a permission prompt and a single
/// current-position query. No watch mode.
pub struct Geolocation<E> {
    context: CapabilityContext<GeolocationOperation, E>,
}

impl<Ev> Capability<Ev> for Geolocation<Ev> {
    type Operation = GeolocationOperation;
    type MappedSelf<MappedEv> = Geolocation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Geolocation::new(self.context.map_event(f))
    }
}

impl<E> Geolocation<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<GeolocationOperation, E>) -> Self {
        Self { context }
    }

    pub fn request_permission<F>(&self, permission: LocationPermission, callback: F)
    where
        F: FnOnce(Result<PermissionStatus, GeolocationError>) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(GeolocationOperation::RequestPermission { permission })
                .await
                .and_then(|output| {
                    output
                        .permission_status()
                        .ok_or(GeolocationError::UnexpectedOutput)
                });
            context.update_app(callback(result));
        });
    }

    pub fn get_current_position<F>(&self, options: PositionOptions, callback: F)
    where
        F: FnOnce(Result<Position, GeolocationError>) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(GeolocationOperation::GetCurrentPosition { options })
                .await
                .and_then(|output| output.position().ok_or(GeolocationError::UnexpectedOutput));
            context.update_app(callback(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_status_checks() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Denied.is_granted());
        assert!(!PermissionStatus::NeverAskAgain.is_granted());
    }

    #[test]
    fn test_only_denial_is_a_permission_error() {
        assert!(GeolocationError::PermissionDenied.is_permission_error());
        assert!(!GeolocationError::Timeout.is_permission_error());
        assert!(!GeolocationError::Platform {
            code: -1,
            message: "internal".into()
        }
        .is_permission_error());
    }

    #[test]
    fn test_output_accessors() {
        let permission = GeolocationOutput::Permission(PermissionStatus::Denied);
        assert_eq!(permission.permission_status(), Some(PermissionStatus::Denied));
        assert_eq!(permission.position(), None);

        let position = GeolocationOutput::Position(Position::new(16.0786, 108.1482));
        assert_eq!(position.permission_status(), None);
        assert_eq!(position.position().map(|p| p.latitude), Some(16.0786));
    }

    #[test]
    fn test_permission_wire_name() {
        let json = serde_json::to_string(&LocationPermission::AccessFineLocation).unwrap();
        assert_eq!(json, "\"ACCESS_FINE_LOCATION\"");
        let coarse: LocationPermission =
            serde_json::from_str("\"ACCESS_COARSE_LOCATION\"").unwrap();
        assert_eq!(coarse, LocationPermission::AccessCoarseLocation);
    }

    #[test]
    fn test_position_accepts_missing_optional_fields() {
        let position: Position =
            serde_json::from_str(r#"{"latitude": 16.0786, "longitude": 108.1482}"#).unwrap();
        assert_eq!(position, Position::new(16.0786, 108.1482));
    }

    #[test]
    fn test_position_options_default_to_platform() {
        let options = PositionOptions::default();
        assert!(!options.enable_high_accuracy);
        assert_eq!(options.timeout_ms, None);
        assert_eq!(options.maximum_age_ms, None);
    }
}
