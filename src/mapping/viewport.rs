use crate::foundation::core::Size;
use crate::foundation::error::{PopError, PopResult};

const EPS: f64 = 1e-6;

/// Axis-aligned rectangle. Placements are expressed in editor-viewport pixels; the mapper also
/// produces natural-resolution rectangles of the same shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PlacementRect {
    /// Create a rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// A placement together with the natural design size it was made against.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Rectangle in viewport pixels.
    pub rect: PlacementRect,
    /// Natural design dimensions at placement time.
    pub natural: Size,
}

/// Fixed editor bounds. The same bounds must be used by the editor and the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    /// Fit width.
    pub max_width: f64,
    /// Fit height.
    pub max_height: f64,
    /// Magnification cap for small designs.
    pub max_zoom: f64,
    /// Minimum placement width (viewport pixels).
    pub min_width: f64,
    /// Minimum placement height (viewport pixels).
    pub min_height: f64,
}

impl Default for ViewportBounds {
    fn default() -> Self {
        crate::foundation::config::PipelineConfig::default().viewport_bounds()
    }
}

/// Scale between a design's natural resolution and the editor viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportScale {
    /// `min(fitWidth / W, fitHeight / H, maxZoom)`.
    pub scale: f64,
    /// Natural design dimensions.
    pub natural: Size,
    /// Scaled design width inside the viewport.
    pub viewport_width: f64,
    /// Scaled design height inside the viewport.
    pub viewport_height: f64,
}

impl ViewportBounds {
    /// Derive the viewport scale for a design of `natural` size.
    pub fn scale_for(&self, natural: Size) -> PopResult<ViewportScale> {
        if natural.width == 0 || natural.height == 0 {
            return Err(PopError::validation("design has empty natural dimensions"));
        }
        let w = f64::from(natural.width);
        let h = f64::from(natural.height);
        let scale = (self.max_width / w).min(self.max_height / h).min(self.max_zoom);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PopError::validation("viewport bounds produce a non-positive scale"));
        }
        Ok(ViewportScale {
            scale,
            natural,
            viewport_width: w * scale,
            viewport_height: h * scale,
        })
    }

    /// Effective minimum size: the configured floor, capped by the viewport itself.
    fn min_size(&self, vs: &ViewportScale) -> (f64, f64) {
        (
            self.min_width.min(vs.viewport_width),
            self.min_height.min(vs.viewport_height),
        )
    }

    /// Reject rectangles outside `[0, vw] x [0, vh]` or below the minimum floors.
    pub fn validate_within(&self, rect: &PlacementRect, natural: Size) -> PopResult<()> {
        let vs = self.scale_for(natural)?;
        if !rect.is_finite() {
            return Err(PopError::placement_out_of_bounds(
                "placement has non-finite coordinates",
            ));
        }
        let (min_w, min_h) = self.min_size(&vs);
        if rect.width + EPS < min_w || rect.height + EPS < min_h {
            return Err(PopError::placement_out_of_bounds(format!(
                "placement {:.1}x{:.1} is below the minimum {min_w:.1}x{min_h:.1}",
                rect.width, rect.height
            )));
        }
        if rect.x < -EPS
            || rect.y < -EPS
            || rect.right() > vs.viewport_width + EPS
            || rect.bottom() > vs.viewport_height + EPS
        {
            return Err(PopError::placement_out_of_bounds(format!(
                "placement ({:.1},{:.1},{:.1},{:.1}) leaves viewport {:.1}x{:.1}",
                rect.x, rect.y, rect.width, rect.height, vs.viewport_width, vs.viewport_height
            )));
        }
        Ok(())
    }

    /// Default placement: centred, sized to a fifth of the shorter viewport side (at least the
    /// minimum floor) with the given width/height aspect.
    pub fn centered_default(&self, natural: Size, aspect: f64) -> PopResult<PlacementRect> {
        let vs = self.scale_for(natural)?;
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let base = (vs.viewport_width.min(vs.viewport_height) / 5.0).max(self.min_width);
        let rect = PlacementRect::new(0.0, 0.0, base, base / aspect);
        let rect = self.clamp_size(&vs, rect);
        Ok(PlacementRect {
            x: (vs.viewport_width - rect.width) / 2.0,
            y: (vs.viewport_height - rect.height) / 2.0,
            ..rect
        })
    }

    /// Move by `(dx, dy)`, stopping at the viewport edges.
    pub fn translate_clamped(
        &self,
        rect: &PlacementRect,
        dx: f64,
        dy: f64,
        natural: Size,
    ) -> PopResult<PlacementRect> {
        ensure_finite(&[rect.x, rect.y, rect.width, rect.height, dx, dy])?;
        let vs = self.scale_for(natural)?;
        let rect = self.clamp_size(&vs, *rect);
        Ok(PlacementRect {
            x: (rect.x + dx).clamp(0.0, vs.viewport_width - rect.width),
            y: (rect.y + dy).clamp(0.0, vs.viewport_height - rect.height),
            ..rect
        })
    }

    /// Resize width and height independently, keeping the top-left corner where possible.
    pub fn resize_clamped(
        &self,
        rect: &PlacementRect,
        width: f64,
        height: f64,
        natural: Size,
    ) -> PopResult<PlacementRect> {
        ensure_finite(&[rect.x, rect.y, width, height])?;
        let vs = self.scale_for(natural)?;
        let sized = self.clamp_size(
            &vs,
            PlacementRect {
                width,
                height,
                ..*rect
            },
        );
        Ok(PlacementRect {
            x: sized.x.clamp(0.0, vs.viewport_width - sized.width),
            y: sized.y.clamp(0.0, vs.viewport_height - sized.height),
            ..sized
        })
    }

    fn clamp_size(&self, vs: &ViewportScale, rect: PlacementRect) -> PlacementRect {
        let (min_w, min_h) = self.min_size(vs);
        PlacementRect {
            width: rect.width.clamp(min_w, vs.viewport_width),
            height: rect.height.clamp(min_h, vs.viewport_height),
            ..rect
        }
    }
}

fn ensure_finite(values: &[f64]) -> PopResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PopError::placement_out_of_bounds(
            "placement edit must use finite coordinates",
        ))
    }
}

impl ViewportScale {
    /// Map a natural-resolution rectangle into viewport pixels.
    pub fn to_viewport(&self, natural_rect: &PlacementRect) -> PlacementRect {
        PlacementRect {
            x: natural_rect.x * self.scale,
            y: natural_rect.y * self.scale,
            width: natural_rect.width * self.scale,
            height: natural_rect.height * self.scale,
        }
    }

    /// Map a viewport rectangle back to natural-resolution pixels.
    pub fn to_natural(&self, viewport_rect: &PlacementRect) -> PlacementRect {
        PlacementRect {
            x: viewport_rect.x / self.scale,
            y: viewport_rect.y / self.scale,
            width: viewport_rect.width / self.scale,
            height: viewport_rect.height / self.scale,
        }
    }
}

/// `toViewport(naturalRect, W, H)` using `bounds`' scale formula.
pub fn to_viewport(
    natural_rect: &PlacementRect,
    natural: Size,
    bounds: &ViewportBounds,
) -> PopResult<PlacementRect> {
    Ok(bounds.scale_for(natural)?.to_viewport(natural_rect))
}

/// `toNatural(viewportRect, W, H)` using `bounds`' scale formula.
pub fn to_natural(
    viewport_rect: &PlacementRect,
    natural: Size,
    bounds: &ViewportBounds,
) -> PopResult<PlacementRect> {
    Ok(bounds.scale_for(natural)?.to_natural(viewport_rect))
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/viewport.rs"]
mod tests;
