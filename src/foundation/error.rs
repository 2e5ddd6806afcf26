/// Result alias used throughout popmark.
pub type PopResult<T> = Result<T, PopError>;

/// Error taxonomy for authoring (sticker, placement, composite, compile) and scan-time sessions.
#[derive(thiserror::Error, Debug)]
pub enum PopError {
    /// Frame spec rejected (bad colour/gradient combination, text too long, unknown frame type).
    #[error("invalid frame spec: {0}")]
    InvalidFrameSpec(String),

    /// Placement rectangle falls outside the editor viewport or under the minimum size.
    #[error("placement out of bounds: {0}")]
    PlacementOutOfBounds(String),

    /// Design bitmap dimensions changed between placement and compositing.
    #[error(
        "composite size mismatch: placed against {expected_width}x{expected_height}, design is {actual_width}x{actual_height}"
    )]
    CompositeSizeMismatch {
        /// Natural width the placement was recorded against.
        expected_width: u32,
        /// Natural height the placement was recorded against.
        expected_height: u32,
        /// Natural width of the design handed to the compositor.
        actual_width: u32,
        /// Natural height of the design handed to the compositor.
        actual_height: u32,
    },

    /// The target compiler failed, timed out, or was cancelled.
    #[error("target compile failure: {0}")]
    TargetCompileFailure(String),

    /// Camera could not be acquired (denied, missing, or held by another session).
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Camera acquisition did not complete within the configured timeout.
    #[error("camera timeout after {timeout_ms} ms")]
    CameraTimeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Video playback requires a user gesture. Not a failure: playback is deferred.
    #[error("autoplay blocked: waiting for a user gesture")]
    AutoplayBlocked,

    /// An asset (video, compiled target, design) could not be loaded or fetched.
    #[error("asset load failure: {0}")]
    AssetLoadFailure(String),

    /// The tracker rejected the compiled target.
    #[error("tracker load failure: {0}")]
    TrackerLoadFailure(String),

    /// Malformed configuration, bitmap, or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    /// Codec and I/O failures carried with context.
    Other(#[from] anyhow::Error),
}

impl PopError {
    /// Build [`PopError::InvalidFrameSpec`].
    pub fn invalid_frame_spec(msg: impl Into<String>) -> Self {
        Self::InvalidFrameSpec(msg.into())
    }

    /// Build [`PopError::PlacementOutOfBounds`].
    pub fn placement_out_of_bounds(msg: impl Into<String>) -> Self {
        Self::PlacementOutOfBounds(msg.into())
    }

    /// Build [`PopError::TargetCompileFailure`].
    pub fn target_compile(msg: impl Into<String>) -> Self {
        Self::TargetCompileFailure(msg.into())
    }

    /// Build [`PopError::CameraUnavailable`].
    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable(msg.into())
    }

    /// Build [`PopError::AssetLoadFailure`].
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoadFailure(msg.into())
    }

    /// Build [`PopError::TrackerLoadFailure`].
    pub fn tracker_load(msg: impl Into<String>) -> Self {
        Self::TrackerLoadFailure(msg.into())
    }

    /// Build [`PopError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Authoring-time errors: the operation is rejected and prior editor state is kept.
    pub fn is_authoring(&self) -> bool {
        matches!(
            self,
            Self::InvalidFrameSpec(_)
                | Self::PlacementOutOfBounds(_)
                | Self::CompositeSizeMismatch { .. }
        )
    }

    /// Runtime errors that put a session into `Error` with a retry affordance.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CameraUnavailable(_)
                | Self::CameraTimeout { .. }
                | Self::TrackerLoadFailure(_)
                | Self::AssetLoadFailure(_)
                | Self::TargetCompileFailure(_)
        )
    }

    /// Errors retried by re-invoking the same operation with identical inputs.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::TargetCompileFailure(_) | Self::AssetLoadFailure(_))
    }

    /// Rebuild a displayable copy (sessions keep their error while also reporting it to callers).
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::InvalidFrameSpec(m) => Self::InvalidFrameSpec(m.clone()),
            Self::PlacementOutOfBounds(m) => Self::PlacementOutOfBounds(m.clone()),
            Self::CompositeSizeMismatch {
                expected_width,
                expected_height,
                actual_width,
                actual_height,
            } => Self::CompositeSizeMismatch {
                expected_width: *expected_width,
                expected_height: *expected_height,
                actual_width: *actual_width,
                actual_height: *actual_height,
            },
            Self::TargetCompileFailure(m) => Self::TargetCompileFailure(m.clone()),
            Self::CameraUnavailable(m) => Self::CameraUnavailable(m.clone()),
            Self::CameraTimeout { timeout_ms } => Self::CameraTimeout {
                timeout_ms: *timeout_ms,
            },
            Self::AutoplayBlocked => Self::AutoplayBlocked,
            Self::AssetLoadFailure(m) => Self::AssetLoadFailure(m.clone()),
            Self::TrackerLoadFailure(m) => Self::TrackerLoadFailure(m.clone()),
            Self::Validation(m) => Self::Validation(m.clone()),
            Self::Other(e) => Self::Other(anyhow::anyhow!("{e:#}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
