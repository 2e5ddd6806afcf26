use kurbo::Rect;

use crate::frame::spec::{FrameType, LabelPlacement};

/// Geometry inputs shared by every frame variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickerMetrics {
    /// Marker side in pixels.
    pub qr_size: u32,
    /// Border stroke width.
    pub border_width: u32,
    /// Quiet zone between border and marker.
    pub padding: u32,
    /// Label height for above/below variants.
    pub label_height: u32,
    /// Label width for the side variant.
    pub label_width: u32,
    /// Corner radius.
    pub corner_radius: f64,
}

impl Default for StickerMetrics {
    fn default() -> Self {
        crate::foundation::config::PipelineConfig::default().sticker_metrics()
    }
}

impl StickerMetrics {
    /// Side of the square body: marker plus padding plus border on both sides.
    pub fn body_side(&self) -> u32 {
        self.qr_size + 2 * self.padding + 2 * self.border_width
    }
}

/// Resolved sticker geometry for one frame variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickerLayout {
    /// Sticker width.
    pub width: u32,
    /// Sticker height.
    pub height: u32,
    /// Square region holding border, padding and marker.
    pub body: Rect,
    /// Label region, absent for the identity variant.
    pub label: Option<Rect>,
    /// Top-left pixel where the marker is drawn.
    pub marker_origin: (u32, u32),
}

impl StickerLayout {
    /// Compute the layout for `frame_type`.
    ///
    /// `marker_side` is only consulted by [`FrameType::Plain`], whose output is the marker itself.
    pub fn compute(frame_type: FrameType, m: &StickerMetrics, marker_side: u32) -> Self {
        let s = m.body_side();
        let sf = f64::from(s);
        let inset = m.border_width + m.padding;
        let lh = f64::from(m.label_height);
        let lw = f64::from(m.label_width);

        match frame_type.label_placement() {
            LabelPlacement::Hidden => Self {
                width: marker_side,
                height: marker_side,
                body: Rect::new(0.0, 0.0, f64::from(marker_side), f64::from(marker_side)),
                label: None,
                marker_origin: (0, 0),
            },
            LabelPlacement::Below => Self {
                width: s,
                height: s + m.label_height,
                body: Rect::new(0.0, 0.0, sf, sf),
                label: Some(Rect::new(0.0, sf, sf, sf + lh)),
                marker_origin: (inset, inset),
            },
            LabelPlacement::Above => Self {
                width: s,
                height: s + m.label_height,
                body: Rect::new(0.0, lh, sf, lh + sf),
                label: Some(Rect::new(0.0, 0.0, sf, lh)),
                marker_origin: (inset, m.label_height + inset),
            },
            LabelPlacement::Right => Self {
                width: s + m.label_width,
                height: s,
                body: Rect::new(0.0, 0.0, sf, sf),
                label: Some(Rect::new(sf, 0.0, sf + lw, sf)),
                marker_origin: (inset, inset),
            },
        }
    }

    /// Full sticker bounds.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/layout.rs"]
mod tests;
