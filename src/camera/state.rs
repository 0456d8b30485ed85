use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of the capture session:
/// idle -> requesting -> active <-> error, back to idle on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraStatus {
    Idle,
    Requesting,
    Active,
    Error,
}

/// Which physical camera is requested on multi-camera devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    /// Front-facing ("selfie") camera.
    User,
    /// Rear camera, the default for photographing an animal.
    Environment,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraErrorKind {
    Permission,
    NotSupported,
    NotFound,
    Unknown,
}

/// Acquisition/capture failure surfaced to the UI. The `type` wire name is
/// what the retry banner switches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct CameraError {
    #[serde(rename = "type")]
    pub kind: CameraErrorKind,
    pub message: String,
}

impl CameraError {
    pub fn new(kind: CameraErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(CameraErrorKind::Permission, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(CameraErrorKind::NotSupported, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CameraErrorKind::NotFound, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(CameraErrorKind::Unknown, message)
    }
}

/// Requested stream geometry and capture encoding quality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
    /// JPEG quality (1-100) used when rendering a captured frame.
    pub quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            width: 1280,
            height: 720,
            quality: 85,
        }
    }
}

/// Point-in-time view of the controller for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    pub status: CameraStatus,
    pub is_supported: bool,
    pub can_switch: bool,
    pub facing_mode: FacingMode,
    pub error: Option<CameraError>,
}
