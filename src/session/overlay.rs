use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::animation::clip::{AnimationConfig, OverlayPose, PopOutClip};
use crate::composite::compositor::CompositeImage;
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{PopError, PopResult};
use crate::session::platform::{
    CameraConstraints, CameraLease, CameraStream, DetectionEvent, FrameRequestId, MarkerPose,
    SessionPlatform, TrackerHandle, VideoAsset, VideoElement,
};
use crate::session::state::{SessionState, is_allowed};
use crate::target::compiler::CompiledTarget;
use crate::target::job::{CompileJob, TargetCompilerAdapter};

/// Where a session gets its compiled target from.
pub enum TargetSource {
    Ready(CompiledTarget),
    /// Still compiling; the session waits for it after acquiring the camera.
    Compiling(PendingTarget),
}

/// An in-flight compile the session can wait on, cancel, and restart on retry.
pub struct PendingTarget {
    adapter: TargetCompilerAdapter,
    composite: Arc<CompositeImage>,
    job: CompileJob,
}

impl TargetSource {
    /// Start compiling `composite` and hand the pending result to a session.
    pub fn compile(
        adapter: TargetCompilerAdapter,
        composite: Arc<CompositeImage>,
    ) -> PopResult<Self> {
        let job = adapter.spawn(Arc::clone(&composite))?;
        Ok(Self::Compiling(PendingTarget {
            adapter,
            composite,
            job,
        }))
    }
}

impl From<CompiledTarget> for TargetSource {
    fn from(target: CompiledTarget) -> Self {
        Self::Ready(target)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum VideoStatus {
    Unloaded,
    Ready,
    Playing,
    Paused,
    /// Autoplay was refused; playback resumes on the next user gesture.
    AwaitingGesture,
}

/// Snapshot published to subscribers on every state or pose change.
#[derive(Debug)]
pub struct SessionEvent {
    pub state: SessionState,
    pub pose: OverlayPose,
    pub anchor: Option<MarkerPose>,
    pub video: VideoStatus,
    pub error: Option<PopError>,
}

enum Handoff {
    Waiting,
    Delivered(PopResult<Box<dyn CameraStream>>),
    Abandoned,
}

struct Acquisition {
    slot: Arc<Mutex<Handoff>>,
    lease: Arc<CameraLease>,
    started: Duration,
}

impl Acquisition {
    /// Give up on the stream; a late arrival is stopped by the worker.
    fn abandon(self) {
        let mut slot = self.slot.lock();
        if let Handoff::Delivered(Ok(mut stream)) =
            std::mem::replace(&mut *slot, Handoff::Abandoned)
        {
            stream.stop();
        }
    }
}

struct ActiveCamera {
    stream: Box<dyn CameraStream>,
    _lease: Arc<CameraLease>,
}

enum Phase {
    Stopped,
    AcquiringCamera(Acquisition),
    AwaitingTarget(ActiveCamera),
    Running {
        camera: ActiveCamera,
        tracker: Box<dyn TrackerHandle>,
        video: Box<dyn VideoElement>,
    },
}

/// Runtime overlay session: camera, tracker and video driven by host frame callbacks.
///
/// The host calls [`OverlaySession::on_frame`] for each frame it was asked for, passing a
/// monotonic timestamp. Nothing here blocks; camera acquisition runs on a worker thread and is
/// polled from frame callbacks.
pub struct OverlaySession {
    platform: SessionPlatform,
    target: TargetSource,
    loaded_target: Option<CompiledTarget>,
    video_asset: VideoAsset,
    clip: PopOutClip,
    camera_timeout: Duration,
    constraints: CameraConstraints,

    state: SessionState,
    phase: Phase,
    pose: OverlayPose,
    anchor: Option<MarkerPose>,
    video_status: VideoStatus,
    clip_start: Option<Duration>,
    pending_frame: Option<FrameRequestId>,
    last_frame: Option<Duration>,
    error: Option<PopError>,
    subscribers: Vec<mpsc::Sender<SessionEvent>>,
}

/// Create an idle session for `target`, playing `video` once the pop-out clip completes.
pub fn create_overlay_session(
    target: impl Into<TargetSource>,
    video: VideoAsset,
    animation: AnimationConfig,
    platform: SessionPlatform,
) -> OverlaySession {
    let clip = PopOutClip::new(&animation);
    OverlaySession {
        platform,
        target: target.into(),
        loaded_target: None,
        video_asset: video,
        clip,
        camera_timeout: PipelineConfig::default().camera_timeout(),
        constraints: CameraConstraints::default(),
        state: SessionState::Idle,
        phase: Phase::Stopped,
        pose: clip.initial_pose(),
        anchor: None,
        video_status: VideoStatus::Unloaded,
        clip_start: None,
        pending_frame: None,
        last_frame: None,
        error: None,
        subscribers: Vec::new(),
    }
}

impl OverlaySession {
    pub fn with_camera_timeout(mut self, timeout: Duration) -> Self {
        self.camera_timeout = timeout;
        self
    }

    pub fn with_camera_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_pose(&self) -> OverlayPose {
        self.pose
    }

    pub fn anchor(&self) -> Option<MarkerPose> {
        self.anchor
    }

    pub fn video_status(&self) -> VideoStatus {
        self.video_status
    }

    pub fn error(&self) -> Option<&PopError> {
        self.error.as_ref()
    }

    /// The frame callback this session is waiting for, if any.
    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.pending_frame
    }

    /// Target currently loaded into the tracker.
    pub fn loaded_target(&self) -> Option<&CompiledTarget> {
        self.loaded_target.as_ref()
    }

    /// Receive every subsequent [`SessionEvent`].
    pub fn subscribe(&mut self) -> mpsc::Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Begin camera acquisition. Only valid from `Idle`. A failed or cancelled compile is
    /// restarted with the same composite.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, now: Duration) -> PopResult<()> {
        if self.state != SessionState::Idle || !matches!(self.phase, Phase::Stopped) {
            return Err(PopError::validation(format!(
                "start requires an idle session, state is {:?}",
                self.state
            )));
        }

        if let TargetSource::Compiling(pending) = &mut self.target
            && matches!(pending.job.poll(), Some(Err(_)))
        {
            tracing::info!("restarting failed compile");
            pending.job = pending.adapter.spawn(Arc::clone(&pending.composite))?;
        }

        let lease = match self.platform.arbiter.try_acquire() {
            Ok(lease) => Arc::new(lease),
            Err(e) => {
                self.fail(e.duplicate());
                return Err(e);
            }
        };

        let slot = Arc::new(Mutex::new(Handoff::Waiting));
        let worker_slot = Arc::clone(&slot);
        let worker_lease = Arc::clone(&lease);
        let camera = Arc::clone(&self.platform.camera);
        let constraints = self.constraints;
        let spawned = std::thread::Builder::new()
            .name("popmark-camera".to_string())
            .spawn(move || {
                let res = camera.request_camera_stream(&constraints);
                let mut slot = worker_slot.lock();
                if matches!(*slot, Handoff::Abandoned) {
                    // The session gave up; the lease is only released once the stream is stopped.
                    if let Ok(mut stream) = res {
                        stream.stop();
                        tracing::debug!("late camera stream stopped");
                    }
                    drop(slot);
                    drop(worker_lease);
                } else {
                    // The session still holds its own lease clone.
                    drop(worker_lease);
                    *slot = Handoff::Delivered(res);
                }
            });
        if let Err(e) = spawned {
            let err = PopError::camera_unavailable(format!("spawn camera worker: {e}"));
            self.fail(err.duplicate());
            return Err(err);
        }

        tracing::info!("camera acquisition started");
        self.error = None;
        self.last_frame = None;
        self.phase = Phase::AcquiringCamera(Acquisition {
            slot,
            lease,
            started: now,
        });
        self.schedule_frame();
        Ok(())
    }

    /// Leave `Error` through `Idle` and start again.
    pub fn retry(&mut self, now: Duration) -> PopResult<()> {
        match &self.error {
            Some(e) if self.state == SessionState::Error && e.is_recoverable() => {}
            Some(e) => {
                return Err(PopError::validation(format!("error is not retriable: {e}")));
            }
            None => return Err(PopError::validation("retry requires a session in Error")),
        }

        self.error = None;
        self.transition(SessionState::Idle);
        self.start(now)
    }

    /// Tear everything down: pending frame, in-flight compile, camera tracks, tracker and video.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) {
        self.teardown();
        if let TargetSource::Compiling(pending) = &mut self.target {
            pending.job.cancel();
        }
        self.error = None;
        if self.state != SessionState::Idle {
            if self.state == SessionState::Lost {
                self.transition(SessionState::Detecting);
            }
            self.transition(SessionState::Idle);
        }
        tracing::info!("session stopped");
    }

    /// Per-display-frame callback. Callbacks other than the pending one are ignored.
    pub fn on_frame(&mut self, id: FrameRequestId, now: Duration) {
        if self.pending_frame != Some(id) {
            tracing::trace!(id = id.0, "stale frame callback ignored");
            return;
        }
        self.pending_frame = None;
        let now = match self.last_frame {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_frame = Some(now);

        let phase = std::mem::replace(&mut self.phase, Phase::Stopped);
        self.phase = match phase {
            Phase::Stopped => Phase::Stopped,
            Phase::AcquiringCamera(acq) => self.poll_camera(acq, now),
            Phase::AwaitingTarget(camera) => self.poll_target(camera),
            running @ Phase::Running { .. } => running,
        };

        let events = match &mut self.phase {
            Phase::Running { tracker, .. } => tracker.drain_events(),
            _ => Vec::new(),
        };
        for event in events {
            self.handle_detection(event);
        }
        if matches!(self.phase, Phase::Running { .. }) {
            self.advance_clip(now);
        }

        if !matches!(self.phase, Phase::Stopped) {
            self.schedule_frame();
        }
    }

    /// Apply one tracker event. Events are ignored unless the session is detecting or tracking.
    pub fn handle_detection(&mut self, event: DetectionEvent) {
        if !matches!(self.phase, Phase::Running { .. }) {
            return;
        }
        match event {
            DetectionEvent::Found(pose) => {
                if !(self.state == SessionState::Detecting || self.state.is_tracking()) {
                    return;
                }
                self.anchor = Some(pose);
                self.clip_start = None;
                self.reset_video();
                self.pose = self.clip.initial_pose();
                self.transition(SessionState::Found);
            }
            DetectionEvent::Moved(pose) => {
                if self.state.is_tracking() {
                    self.anchor = Some(pose);
                }
            }
            DetectionEvent::Lost => {
                if !self.state.is_tracking() {
                    return;
                }
                self.clip_start = None;
                self.reset_video();
                self.pose = self.clip.initial_pose();
                self.anchor = None;
                self.transition(SessionState::Lost);
                self.transition(SessionState::Detecting);
            }
        }
    }

    /// Retry playback that autoplay policy deferred.
    pub fn on_user_gesture(&mut self) {
        if self.video_status == VideoStatus::AwaitingGesture && self.state == SessionState::Steady {
            match self.play_video() {
                Ok(()) => self.emit(),
                Err(e) => self.fail(e),
            }
        }
    }

    fn poll_camera(&mut self, acq: Acquisition, now: Duration) -> Phase {
        let delivered = {
            let mut slot = acq.slot.lock();
            match std::mem::replace(&mut *slot, Handoff::Waiting) {
                Handoff::Delivered(res) => Some(res),
                other => {
                    *slot = other;
                    None
                }
            }
        };

        match delivered {
            Some(Ok(stream)) => {
                tracing::info!(tracks = stream.track_count(), "camera acquired");
                let camera = ActiveCamera {
                    stream,
                    _lease: acq.lease,
                };
                self.poll_target(camera)
            }
            Some(Err(e)) => {
                self.fail(e);
                Phase::Stopped
            }
            None if now.saturating_sub(acq.started) >= self.camera_timeout => {
                acq.abandon();
                self.fail(PopError::CameraTimeout {
                    timeout_ms: self.camera_timeout.as_millis() as u64,
                });
                Phase::Stopped
            }
            None => Phase::AcquiringCamera(acq),
        }
    }

    fn poll_target(&mut self, mut camera: ActiveCamera) -> Phase {
        let target = match &mut self.target {
            TargetSource::Ready(t) => Ok(t.clone()),
            TargetSource::Compiling(pending) => match pending.job.poll() {
                Some(res) => res,
                None => return Phase::AwaitingTarget(camera),
            },
        };

        let loaded = target.and_then(|target| {
            let tracker = self.platform.tracker.load_target(&target)?;
            Ok((target, tracker))
        });
        let (target, mut tracker) = match loaded {
            Ok(v) => v,
            Err(e) => {
                camera.stream.stop();
                self.fail(e);
                return Phase::Stopped;
            }
        };

        let video = match self.platform.video.load(&self.video_asset) {
            Ok(v) => v,
            Err(e) => {
                tracker.unload();
                camera.stream.stop();
                self.fail(e);
                return Phase::Stopped;
            }
        };

        tracing::info!(target_bytes = target.bytes().len(), "tracker ready");
        self.loaded_target = Some(target);
        self.video_status = VideoStatus::Ready;
        self.pose = self.clip.initial_pose();
        self.transition(SessionState::Detecting);
        Phase::Running {
            camera,
            tracker,
            video,
        }
    }

    fn advance_clip(&mut self, now: Duration) {
        match self.state {
            SessionState::Found => {
                self.clip_start = Some(now);
                self.pose = self.clip.initial_pose();
                self.transition(SessionState::Animating);
            }
            SessionState::Animating => {
                let start = *self.clip_start.get_or_insert(now);
                let t = self.clip.progress(now.saturating_sub(start));
                self.pose = self.clip.evaluate(t);
                if t >= 1.0 {
                    match self.play_video() {
                        Ok(()) => self.transition(SessionState::Steady),
                        Err(e) => self.fail(e),
                    }
                } else {
                    self.emit();
                }
            }
            _ => {}
        }
    }

    /// Start playback. A blocked autoplay is deferred, not an error.
    fn play_video(&mut self) -> PopResult<()> {
        let Phase::Running { video, .. } = &mut self.phase else {
            return Ok(());
        };
        match video.play() {
            Ok(()) => self.video_status = VideoStatus::Playing,
            Err(PopError::AutoplayBlocked) => {
                tracing::info!("autoplay blocked, waiting for a user gesture");
                self.video_status = VideoStatus::AwaitingGesture;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn reset_video(&mut self) {
        if let Phase::Running { video, .. } = &mut self.phase
            && self.video_status != VideoStatus::Ready
        {
            video.pause();
            video.rewind();
            self.video_status = VideoStatus::Paused;
        }
    }

    fn schedule_frame(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.platform.scheduler.request_frame());
        }
    }

    fn teardown(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.platform.scheduler.cancel_frame(id);
        }
        match std::mem::replace(&mut self.phase, Phase::Stopped) {
            Phase::Stopped => {}
            Phase::AcquiringCamera(acq) => acq.abandon(),
            Phase::AwaitingTarget(mut camera) => camera.stream.stop(),
            Phase::Running {
                mut camera,
                mut tracker,
                mut video,
            } => {
                video.pause();
                video.release();
                tracker.unload();
                camera.stream.stop();
            }
        }
        self.loaded_target = None;
        self.clip_start = None;
        self.anchor = None;
        self.video_status = VideoStatus::Unloaded;
        self.pose = self.clip.initial_pose();
    }

    fn fail(&mut self, error: PopError) {
        tracing::warn!(error = %error, state = ?self.state, "session error");
        self.teardown();
        if self.state == SessionState::Lost {
            self.transition(SessionState::Detecting);
        }
        self.error = Some(error);
        if self.state != SessionState::Error {
            self.transition(SessionState::Error);
        } else {
            self.emit();
        }
    }

    fn transition(&mut self, to: SessionState) {
        if !is_allowed(self.state, to) {
            tracing::error!(from = ?self.state, to = ?to, "illegal session transition skipped");
            return;
        }
        tracing::debug!(from = ?self.state, to = ?to, "session transition");
        self.state = to;
        self.emit();
    }

    fn emit(&mut self) {
        let (state, pose, anchor, video) = (self.state, self.pose, self.anchor, self.video_status);
        let error = &self.error;
        self.subscribers.retain(|tx| {
            tx.send(SessionEvent {
                state,
                pose,
                anchor,
                video,
                error: error.as_ref().map(PopError::duplicate),
            })
            .is_ok()
        });
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        self.teardown();
        if let TargetSource::Compiling(pending) = &mut self.target {
            pending.job.cancel();
        }
    }
}
