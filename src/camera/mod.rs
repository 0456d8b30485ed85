mod avfoundation;
pub(crate) mod commands;
mod controller;
mod device;
mod state;

pub use controller::CameraController;
pub use device::{CameraDevice, CameraStream, Frame, SystemCamera};
pub use state::{CameraConfig, CameraError, CameraErrorKind, CameraSnapshot, CameraStatus, FacingMode};
