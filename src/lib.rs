//! popmark turns a scannable marker into a framed sticker, bakes it into a campaign design,
//! compiles the result into a tracker target and drives the scan-time pop-out overlay.
//!
//! Authoring side:
//!
//! - [`render_sticker`] frames a marker according to a [`FrameSpec`]
//! - [`ViewportBounds`] maps editor placements to natural design pixels
//! - [`compose`] and [`TargetCompilerAdapter`] produce a [`CompositeImage`] / [`CompiledTarget`]
//!   pair, tracked by a [`DesignDraft`] and published with [`publish_design`]
//!
//! Scan side: [`create_overlay_session`] builds an [`OverlaySession`] over host-provided camera,
//! tracker, video and frame-scheduler capabilities.
#![forbid(unsafe_code)]

pub mod animation;
pub mod authoring;
pub mod composite;
pub mod foundation;
pub mod frame;
pub mod mapping;
pub mod session;
pub mod target;

pub use crate::animation::clip::{
    AnimationConfig, OverlayPose, PopOutClip, SceneTransform, evaluate,
};
pub use crate::animation::ease::Ease;
pub use crate::authoring::draft::{ComposeOutput, DesignDraft, compose_and_compile};
pub use crate::authoring::publish::{
    AssetStore, Campaign, CampaignPatch, CampaignStore, MemoryAssetStore, MemoryCampaignStore,
    ScanTarget, load_scan_target, publish_design,
};
pub use crate::composite::compositor::{CompositeImage, compose};
pub use crate::foundation::config::PipelineConfig;
pub use crate::foundation::core::{DesignBitmap, MarkerBitmap, Rgba8, Size, StickerBitmap};
pub use crate::foundation::error::{PopError, PopResult};
pub use crate::frame::fonts::FONTS_DIR_ENV;
pub use crate::frame::layout::{StickerLayout, StickerMetrics};
pub use crate::frame::render::{render_sticker, render_sticker_svg};
pub use crate::frame::spec::{FrameSpec, FrameType, LabelPlacement, TextFill, TextStyle};
pub use crate::mapping::viewport::{
    Placement, PlacementRect, ViewportBounds, ViewportScale, to_natural, to_viewport,
};
pub use crate::session::overlay::{
    OverlaySession, PendingTarget, SessionEvent, TargetSource, VideoStatus,
    create_overlay_session,
};
pub use crate::session::platform::{
    CameraArbiter, CameraConstraints, CameraLease, CameraPlatform, CameraStream, DetectionEvent,
    FacingMode, FrameRequestId, FrameScheduler, MarkerPose, SessionPlatform, TrackerBackend,
    TrackerHandle, VideoAsset, VideoBackend, VideoElement,
};
pub use crate::session::state::SessionState;
pub use crate::target::compiler::{
    CancelToken, CompiledTarget, PyramidCompiler, PyramidInfo, TargetCompiler,
};
pub use crate::target::job::{CompileJob, TargetCompilerAdapter, retry_idempotent};
