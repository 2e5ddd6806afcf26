use std::time::Duration;

use crate::animation::channel::Channel;
use crate::animation::ease::Ease;

const START_SCALE: f64 = 0.01;
const END_SCALE: f64 = 1.0;
const START_HEIGHT: f64 = 0.1;
const START_TILT_DEG: f64 = -90.0;

/// Pop-out clip parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Clip length; `0` means the clip is complete immediately.
    pub duration_ms: u64,
    /// Final distance the overlay travels out of the marker plane (marker units).
    pub pop_out_distance: f64,
    /// Final lift above the marker centre (marker units).
    pub lift_height: f64,
    /// Final tilt is `-viewer_angle_deg`.
    pub viewer_angle_deg: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        crate::foundation::config::PipelineConfig::default().animation()
    }
}

/// Overlay transform and opacity at one instant of the clip.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPose {
    pub scale: f64,
    pub depth_offset: f64,
    pub height_offset: f64,
    /// Rotation about the marker's x axis, degrees.
    pub tilt_deg: f64,
    pub opacity: f64,
}

/// Pose expressed for a 3D scene graph anchored on the marker.
///
/// Axes: x along the marker's right edge, y along its up edge, z out of the marker plane.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTransform {
    pub translation: [f64; 3],
    pub rotation_x_rad: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl OverlayPose {
    pub fn scene_transform(&self) -> SceneTransform {
        SceneTransform {
            translation: [0.0, self.height_offset, self.depth_offset],
            rotation_x_rad: self.tilt_deg.to_radians(),
            scale: self.scale,
            opacity: self.opacity,
        }
    }
}

/// The pop-out clip: five eased channels over one duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopOutClip {
    duration_ms: u64,
    scale: Channel,
    depth: Channel,
    height: Channel,
    tilt: Channel,
    opacity: Channel,
}

impl PopOutClip {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            duration_ms: config.duration_ms,
            scale: Channel::new(START_SCALE, END_SCALE, Ease::OutBack),
            depth: Channel::new(0.0, config.pop_out_distance, Ease::OutCubic),
            height: Channel::new(START_HEIGHT, config.lift_height, Ease::OutCubic),
            tilt: Channel::new(START_TILT_DEG, -config.viewer_angle_deg, Ease::OutCubic),
            opacity: Channel::new(0.0, 1.0, Ease::InOutQuad),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Normalized progress for `elapsed`, clamped to `[0, 1]`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let ms = elapsed.as_secs_f64() * 1000.0;
        (ms / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    /// Pose at normalized time `t`. Out-of-range and NaN input is clamped.
    pub fn evaluate(&self, t: f64) -> OverlayPose {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        OverlayPose {
            scale: self.scale.sample(t),
            depth_offset: self.depth.sample(t),
            height_offset: self.height.sample(t),
            tilt_deg: self.tilt.sample(t),
            opacity: self.opacity.sample(t),
        }
    }

    pub fn sample_at(&self, elapsed: Duration) -> OverlayPose {
        self.evaluate(self.progress(elapsed))
    }

    pub fn initial_pose(&self) -> OverlayPose {
        self.evaluate(0.0)
    }

    pub fn final_pose(&self) -> OverlayPose {
        self.evaluate(1.0)
    }
}

/// Pose at normalized time `t` for `config`.
pub fn evaluate(t: f64, config: &AnimationConfig) -> OverlayPose {
    PopOutClip::new(config).evaluate(t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clip.rs"]
mod tests;
