use std::path::Path;

use anyhow::Context;

use crate::animation::clip::AnimationConfig;
use crate::foundation::error::{PopError, PopResult};
use crate::frame::layout::StickerMetrics;
use crate::mapping::viewport::ViewportBounds;

/// Recognised pipeline options. Every field has a documented default, so partial JSON is fine.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Side of the marker area inside the sticker, in pixels.
    pub qr_size: u32,
    /// Frame border stroke width, in pixels.
    pub border_width: u32,
    /// Quiet zone between border and marker, in pixels.
    pub padding: u32,
    /// Height of the label bar for above/below frame types.
    pub label_height: u32,
    /// Width of the side label for frame type 8.
    pub label_width: u32,
    /// Corner radius for rounded rectangles and brackets.
    pub corner_radius: f64,
    /// Editor viewport width the design is fitted into.
    pub max_viewport_width: f64,
    /// Editor viewport height the design is fitted into.
    pub max_viewport_height: f64,
    /// Upper bound on editor magnification for small designs.
    pub max_zoom: f64,
    /// Minimum placement width in viewport pixels.
    pub min_placement_width: f64,
    /// Minimum placement height in viewport pixels.
    pub min_placement_height: f64,
    /// Pop-out clip duration.
    pub animation_duration_ms: u64,
    /// Final distance of the overlay toward the viewer.
    pub pop_out_distance: f64,
    /// Final lift of the overlay off the marker plane.
    pub lift_height: f64,
    /// Final viewing angle in degrees (the overlay ends tilted at `-viewerAngle`).
    pub viewer_angle: f64,
    /// Camera acquisition timeout.
    pub camera_timeout_ms: u64,
    /// Target compilation timeout.
    pub compile_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            qr_size: 300,
            border_width: 4,
            padding: 16,
            label_height: 40,
            label_width: 40,
            corner_radius: 8.0,
            max_viewport_width: 800.0,
            max_viewport_height: 600.0,
            max_zoom: 1.0,
            min_placement_width: 50.0,
            min_placement_height: 50.0,
            animation_duration_ms: 1500,
            pop_out_distance: 0.8,
            lift_height: 0.3,
            viewer_angle: 60.0,
            camera_timeout_ms: 5000,
            compile_timeout_ms: 60_000,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration string and validate it.
    pub fn from_json_str(s: &str) -> PopResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| PopError::validation(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> PopResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Reject values that would produce empty or non-finite geometry.
    pub fn validate(&self) -> PopResult<()> {
        if self.qr_size == 0 {
            return Err(PopError::validation("qrSize must be > 0"));
        }
        if self.label_height == 0 || self.label_width == 0 {
            return Err(PopError::validation("label dimensions must be > 0"));
        }
        let positive = [
            ("maxViewportWidth", self.max_viewport_width),
            ("maxViewportHeight", self.max_viewport_height),
            ("maxZoom", self.max_zoom),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(PopError::validation(format!("{name} must be finite and > 0")));
            }
        }
        let non_negative = [
            ("cornerRadius", self.corner_radius),
            ("minPlacementWidth", self.min_placement_width),
            ("minPlacementHeight", self.min_placement_height),
            ("popOutDistance", self.pop_out_distance),
            ("liftHeight", self.lift_height),
            ("viewerAngle", self.viewer_angle),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(PopError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.camera_timeout_ms == 0 {
            return Err(PopError::validation("cameraTimeoutMs must be > 0"));
        }
        if self.compile_timeout_ms == 0 {
            return Err(PopError::validation("compileTimeoutMs must be > 0"));
        }
        Ok(())
    }

    /// Sticker geometry inputs for the frame renderer.
    pub fn sticker_metrics(&self) -> StickerMetrics {
        StickerMetrics {
            qr_size: self.qr_size,
            border_width: self.border_width,
            padding: self.padding,
            label_height: self.label_height,
            label_width: self.label_width,
            corner_radius: self.corner_radius,
        }
    }

    /// Editor viewport bounds used by both the editor and the compositor.
    pub fn viewport_bounds(&self) -> ViewportBounds {
        ViewportBounds {
            max_width: self.max_viewport_width,
            max_height: self.max_viewport_height,
            max_zoom: self.max_zoom,
            min_width: self.min_placement_width,
            min_height: self.min_placement_height,
        }
    }

    /// Pop-out clip parameters.
    pub fn animation(&self) -> AnimationConfig {
        AnimationConfig {
            duration_ms: self.animation_duration_ms,
            pop_out_distance: self.pop_out_distance,
            lift_height: self.lift_height,
            viewer_angle_deg: self.viewer_angle,
        }
    }

    /// Camera acquisition timeout as a duration.
    pub fn camera_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.camera_timeout_ms)
    }

    /// Compile timeout as a duration.
    pub fn compile_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.compile_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
