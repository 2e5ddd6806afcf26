//! Capabilities a host provides to an overlay session: camera, marker tracker, video playback and
//! a per-display-frame scheduler.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::error::{PopError, PopResult};
use crate::target::compiler::CompiledTarget;

/// Which camera to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    User,
    #[default]
    Environment,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConstraints {
    pub facing: FacingMode,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

/// A live camera stream. `stop` must end every track.
pub trait CameraStream: Send {
    fn track_count(&self) -> usize;
    fn stop(&mut self);
}

/// Camera acquisition. Called on a worker thread and may block (permission prompts, slow devices).
pub trait CameraPlatform: Send + Sync {
    fn request_camera_stream(
        &self,
        constraints: &CameraConstraints,
    ) -> PopResult<Box<dyn CameraStream>>;
}

/// Hands out the device camera to at most one session at a time.
#[derive(Clone, Debug, Default)]
pub struct CameraArbiter {
    busy: Arc<Mutex<bool>>,
}

impl CameraArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> PopResult<CameraLease> {
        let mut busy = self.busy.lock();
        if *busy {
            return Err(PopError::camera_unavailable(
                "camera is held by another session",
            ));
        }
        *busy = true;
        Ok(CameraLease {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.lock()
    }
}

/// Exclusive right to the camera; released on drop.
#[derive(Debug)]
pub struct CameraLease {
    busy: Arc<Mutex<bool>>,
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        *self.busy.lock() = false;
    }
}

/// Marker pose in camera space, column-major 4x4.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MarkerPose {
    pub matrix: [f64; 16],
}

impl MarkerPose {
    pub const IDENTITY: Self = Self {
        matrix: [
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ],
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DetectionEvent {
    /// Marker appeared.
    Found(MarkerPose),
    /// Marker still visible at a new pose.
    Moved(MarkerPose),
    Lost,
}

/// Marker tracker capability.
pub trait TrackerBackend {
    fn load_target(&mut self, target: &CompiledTarget) -> PopResult<Box<dyn TrackerHandle>>;
}

/// A loaded target. Events come out in arrival order.
pub trait TrackerHandle {
    fn drain_events(&mut self) -> Vec<DetectionEvent>;
    fn unload(&mut self);
}

/// Overlay video source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAsset {
    pub url: String,
    #[serde(default = "default_loop")]
    pub looped: bool,
}

fn default_loop() -> bool {
    true
}

impl VideoAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            looped: true,
        }
    }
}

pub trait VideoBackend {
    fn load(&mut self, asset: &VideoAsset) -> PopResult<Box<dyn VideoElement>>;
}

/// A loaded video element.
pub trait VideoElement {
    /// May fail with [`PopError::AutoplayBlocked`] until a user gesture happened.
    fn play(&mut self) -> PopResult<()>;
    fn pause(&mut self);
    fn rewind(&mut self);
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FrameRequestId(pub u64);

/// Per-display-frame callback scheduling (`requestAnimationFrame` style).
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequestId;
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Everything a session needs from its host.
pub struct SessionPlatform {
    pub camera: Arc<dyn CameraPlatform>,
    pub arbiter: CameraArbiter,
    pub tracker: Box<dyn TrackerBackend>,
    pub video: Box<dyn VideoBackend>,
    pub scheduler: Box<dyn FrameScheduler>,
}
