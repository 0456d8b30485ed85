use async_trait::async_trait;

use super::avfoundation;
use super::state::{CameraConfig, CameraError, FacingMode};

/// One still frame grabbed from a live stream, already JPEG-encoded by the
/// capture backend.
pub struct Frame {
    pub jpeg: Vec<u8>,
}

/// Capture hardware seen through a narrow seam so the controller stays
/// platform-agnostic (and testable against a scripted device).
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Whether any camera is present at all. When this is false the
    /// controller refuses to start without touching the hardware.
    fn is_supported(&self) -> bool;

    /// Whether both facings exist, enabling the front/back switch.
    fn can_switch(&self) -> bool;

    /// Acquire the device and begin streaming. At most one stream may be
    /// live per device; callers release the previous one first.
    async fn open(&self, config: &CameraConfig) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// Live stream handle. Dropping it releases the underlying device; that is
/// the release path for every exit (stop, switch teardown, superseded
/// acquisition, controller teardown), so a handle must never be leaked.
#[async_trait]
pub trait CameraStream: Send {
    fn facing(&self) -> FacingMode;

    /// Snapshot the current video frame.
    async fn grab_frame(&mut self) -> Result<Frame, CameraError>;
}

/// The real device, backed by the AVFoundation plugin on macOS. Elsewhere
/// it reports no camera and the controller never attempts acquisition.
pub struct SystemCamera;

impl SystemCamera {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for SystemCamera {
    fn is_supported(&self) -> bool {
        avfoundation::device_available()
    }

    fn can_switch(&self) -> bool {
        avfoundation::has_facing(FacingMode::User) && avfoundation::has_facing(FacingMode::Environment)
    }

    async fn open(&self, config: &CameraConfig) -> Result<Box<dyn CameraStream>, CameraError> {
        let facing = config.facing_mode;
        let (width, height) = (config.width, config.height);

        // Session setup blocks on the OS permission prompt; keep it off the
        // async workers.
        let session = tokio::task::spawn_blocking(move || {
            avfoundation::open_session(facing, width, height)
        })
        .await
        .map_err(|err| CameraError::unknown(format!("camera open worker failed: {err}")))??;

        Ok(Box::new(SystemStream { session, facing }))
    }
}

struct SystemStream {
    session: i32,
    facing: FacingMode,
}

#[async_trait]
impl CameraStream for SystemStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    async fn grab_frame(&mut self) -> Result<Frame, CameraError> {
        let session = self.session;
        let jpeg = tokio::task::spawn_blocking(move || avfoundation::grab_frame(session))
            .await
            .map_err(|err| CameraError::unknown(format!("frame grab worker failed: {err}")))??;
        Ok(Frame { jpeg })
    }
}

impl Drop for SystemStream {
    fn drop(&mut self) {
        avfoundation::close_session(self.session);
    }
}
