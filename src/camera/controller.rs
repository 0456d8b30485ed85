use std::{sync::Arc, time::Duration};

use log::{info, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{models::PhotoPayload, photo};

use super::device::{CameraDevice, CameraStream};
use super::state::{CameraConfig, CameraError, CameraSnapshot, CameraStatus, FacingMode};

/// How long a single acquisition attempt may block on the OS (permission
/// prompt included) before it is classified as failed.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Owner of the device camera for the session.
///
/// Holds at most one live stream; every exit path (stop, switch teardown,
/// superseded or cancelled acquisition, teardown of the controller itself)
/// releases it by dropping the stream handle. Acquisition failures are
/// terminal for the attempt; `retry` is the only recovery path.
#[derive(Clone)]
pub struct CameraController {
    device: Arc<dyn CameraDevice>,
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    status: CameraStatus,
    stream: Option<Box<dyn CameraStream>>,
    error: Option<CameraError>,
    config: CameraConfig,
    acquire_token: Option<CancellationToken>,
    /// Bumped per acquisition attempt so a stale open cannot install its
    /// stream over a newer one.
    acquire_generation: u64,
}

impl CameraController {
    pub fn new(device: Arc<dyn CameraDevice>, config: CameraConfig) -> Self {
        Self {
            device,
            inner: Arc::new(Mutex::new(Inner {
                status: CameraStatus::Idle,
                stream: None,
                error: None,
                config,
                acquire_token: None,
                acquire_generation: 0,
            })),
        }
    }

    pub async fn snapshot(&self) -> CameraSnapshot {
        let inner = self.inner.lock().await;
        self.snapshot_of(&inner)
    }

    pub async fn config(&self) -> CameraConfig {
        self.inner.lock().await.config
    }

    /// Applies to the next acquisition and capture; a live stream keeps the
    /// geometry it was opened with.
    pub async fn set_config(&self, config: CameraConfig) {
        self.inner.lock().await.config = config;
    }

    /// Request the camera and start streaming. Starting while a stream is
    /// live releases that stream first, so the device never sees two
    /// concurrent acquisitions from this session.
    pub async fn start(&self, facing: Option<FacingMode>) -> Result<CameraSnapshot, CameraError> {
        if !self.device.is_supported() {
            let err = CameraError::not_supported("no camera is available on this device");
            let mut inner = self.inner.lock().await;
            inner.status = CameraStatus::Error;
            inner.error = Some(err.clone());
            return Err(err);
        }

        let (config, token, generation) = {
            let mut inner = self.inner.lock().await;
            if let Some(facing) = facing {
                inner.config.facing_mode = facing;
            }
            self.begin_request(&mut inner)
        };

        self.acquire(config, token, generation).await
    }

    /// Re-run the last failed acquisition. Only meaningful from the error
    /// state; anywhere else it reports the current state unchanged.
    pub async fn retry(&self) -> Result<CameraSnapshot, CameraError> {
        let (config, token, generation) = {
            let mut inner = self.inner.lock().await;
            if inner.status != CameraStatus::Error {
                return Ok(self.snapshot_of(&inner));
            }
            self.begin_request(&mut inner)
        };

        self.acquire(config, token, generation).await
    }

    /// Tear down the current stream and re-request the opposite facing.
    /// Valid only while active on devices that have both cameras; a failed
    /// re-acquisition lands in the error state with no stream left running.
    pub async fn switch(&self) -> Result<CameraSnapshot, CameraError> {
        if !self.device.can_switch() {
            return Err(CameraError::not_supported(
                "this device has a single camera",
            ));
        }

        let (config, token, generation) = {
            let mut inner = self.inner.lock().await;
            if inner.status != CameraStatus::Active {
                return Ok(self.snapshot_of(&inner));
            }
            inner.config.facing_mode = inner.config.facing_mode.opposite();
            self.begin_request(&mut inner)
        };

        self.acquire(config, token, generation).await
    }

    /// Snapshot the current frame as a photo at the configured resolution
    /// and quality. A controller that is not active returns `Ok(None)` and
    /// touches nothing.
    pub async fn capture(&self) -> Result<Option<PhotoPayload>, CameraError> {
        let (frame, config) = {
            let mut inner = self.inner.lock().await;
            if inner.status != CameraStatus::Active {
                return Ok(None);
            }
            let Some(stream) = inner.stream.as_mut() else {
                return Ok(None);
            };
            let frame = stream.grab_frame().await?;
            (frame, inner.config)
        };

        let payload = tokio::task::spawn_blocking(move || {
            photo::render_capture(&frame.jpeg, config.width, config.height, config.quality)
        })
        .await
        .map_err(|err| CameraError::unknown(format!("capture render worker failed: {err}")))?
        .map_err(|err| CameraError::unknown(format!("captured frame could not be rendered: {err}")))?;

        Ok(Some(payload))
    }

    /// Release the device. Idempotent and infallible; cancels an in-flight
    /// acquisition, whose stream is released as soon as it settles.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(token) = inner.acquire_token.take() {
            token.cancel();
        }
        if inner.stream.take().is_some() {
            info!("camera stream released");
        }
        inner.status = CameraStatus::Idle;
        inner.error = None;
    }

    /// Move into `requesting`, dropping any live stream and superseding any
    /// in-flight attempt. Caller holds the lock.
    fn begin_request(&self, inner: &mut Inner) -> (CameraConfig, CancellationToken, u64) {
        inner.stream.take();
        inner.status = CameraStatus::Requesting;
        inner.error = None;
        inner.acquire_generation += 1;
        let token = CancellationToken::new();
        inner.acquire_token = Some(token.clone());
        (inner.config, token, inner.acquire_generation)
    }

    async fn acquire(
        &self,
        config: CameraConfig,
        token: CancellationToken,
        generation: u64,
    ) -> Result<CameraSnapshot, CameraError> {
        let opened = tokio::time::timeout(
            Duration::from_secs(ACQUIRE_TIMEOUT_SECS),
            self.device.open(&config),
        )
        .await;

        let mut inner = self.inner.lock().await;

        // A stop or a newer attempt won while we were waiting. The settled
        // stream (if any) is dropped on return, which releases the device.
        if token.is_cancelled() || inner.acquire_generation != generation {
            return Ok(self.snapshot_of(&inner));
        }
        inner.acquire_token = None;

        match opened {
            Ok(Ok(stream)) => {
                inner.status = CameraStatus::Active;
                inner.error = None;
                inner.stream = Some(stream);
                info!("camera stream active ({:?})", config.facing_mode);
                Ok(self.snapshot_of(&inner))
            }
            Ok(Err(err)) => {
                warn!("camera acquisition failed: {err}");
                inner.status = CameraStatus::Error;
                inner.stream = None;
                inner.error = Some(err.clone());
                Err(err)
            }
            Err(_) => {
                let err = CameraError::unknown(format!(
                    "camera acquisition timed out after {ACQUIRE_TIMEOUT_SECS}s"
                ));
                warn!("{err}");
                inner.status = CameraStatus::Error;
                inner.stream = None;
                inner.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn snapshot_of(&self, inner: &Inner) -> CameraSnapshot {
        CameraSnapshot {
            status: inner.status,
            is_supported: self.device.is_supported(),
            can_switch: self.device.can_switch(),
            facing_mode: inner.config.facing_mode,
            error: inner.error.clone(),
        }
    }
}
