use image::imageops::FilterType;

use crate::composite::blend::over_in_place_at;
use crate::foundation::core::{MarkerBitmap, StickerBitmap};
use crate::foundation::error::{PopError, PopResult};
use crate::foundation::math::{demultiply_in_place, premultiply_in_place};
use crate::frame::fonts::svg_options;
use crate::frame::layout::{StickerLayout, StickerMetrics};
use crate::frame::spec::{FrameSpec, FrameType};
use crate::frame::variants::{DrawCtx, build_svg};

/// Render a sticker: the marker framed and labelled according to `spec`.
///
/// Output is a pure function of the inputs. [`FrameType::Plain`] returns the marker unchanged; every
/// other variant resamples the marker to `metrics.qr_size` when its side differs.
#[tracing::instrument(skip(marker, spec, metrics), fields(frame_type = spec.frame_type.number()))]
pub fn render_sticker(
    marker: &MarkerBitmap,
    spec: &FrameSpec,
    metrics: &StickerMetrics,
) -> PopResult<StickerBitmap> {
    spec.validate()?;
    check_marker(marker)?;

    if spec.frame_type == FrameType::Plain {
        return Ok(marker.clone());
    }
    if metrics.qr_size == 0 {
        return Err(PopError::validation("qrSize must be > 0"));
    }

    let layout = StickerLayout::compute(spec.frame_type, metrics, metrics.qr_size);
    let svg = build_svg(&DrawCtx {
        spec,
        metrics,
        layout: &layout,
    });
    let mut surface = rasterize(&svg, layout.width, layout.height)?;

    let marker = normalized_marker(marker, metrics.qr_size);
    let mut marker_px = marker.into_raw();
    premultiply_in_place(&mut marker_px);
    over_in_place_at(
        &mut surface,
        layout.width,
        layout.height,
        &marker_px,
        metrics.qr_size,
        metrics.qr_size,
        layout.marker_origin,
    )?;

    demultiply_in_place(&mut surface);
    let sticker = StickerBitmap::from_raw(layout.width, layout.height, surface)
        .ok_or_else(|| PopError::validation("sticker buffer size mismatch"))?;
    tracing::debug!(
        width = sticker.width(),
        height = sticker.height(),
        "sticker rendered"
    );
    Ok(sticker)
}

/// SVG markup of the frame (without the marker), for previews and debugging.
pub fn render_sticker_svg(spec: &FrameSpec, metrics: &StickerMetrics) -> PopResult<String> {
    spec.validate()?;
    if spec.frame_type == FrameType::Plain {
        return Err(PopError::invalid_frame_spec(
            "frameType 10 has no frame markup",
        ));
    }
    let layout = StickerLayout::compute(spec.frame_type, metrics, metrics.qr_size);
    Ok(build_svg(&DrawCtx {
        spec,
        metrics,
        layout: &layout,
    }))
}

fn check_marker(marker: &MarkerBitmap) -> PopResult<()> {
    let (w, h) = marker.dimensions();
    if w == 0 || h == 0 {
        return Err(PopError::validation("marker bitmap is empty"));
    }
    if w != h {
        return Err(PopError::validation(format!(
            "marker bitmap must be square, got {w}x{h}"
        )));
    }
    Ok(())
}

fn normalized_marker(marker: &MarkerBitmap, side: u32) -> MarkerBitmap {
    if marker.width() == side {
        return marker.clone();
    }
    // Nearest keeps module edges hard, which is what scanners want.
    image::imageops::resize(marker, side, side, FilterType::Nearest)
}

fn rasterize(svg: &str, width: u32, height: u32) -> PopResult<Vec<u8>> {
    let opts = svg_options();
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| PopError::invalid_frame_spec(format!("frame svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PopError::validation("failed to allocate sticker pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/frame/render.rs"]
mod tests;
