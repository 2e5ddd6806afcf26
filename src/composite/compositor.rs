use std::io::Cursor;

use anyhow::Context;
use image::imageops::FilterType;

use crate::composite::blend::over_in_place_at;
use crate::foundation::core::{DesignBitmap, Size, StickerBitmap};
use crate::foundation::error::{PopError, PopResult};
use crate::foundation::math::{demultiply_in_place, fingerprint_rgba, premultiply_in_place};
use crate::mapping::viewport::{Placement, ViewportBounds};

/// Design with the sticker baked in at natural resolution. Read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeImage {
    image: image::RgbaImage,
    fingerprint: u64,
}

impl CompositeImage {
    /// Wrap an existing bitmap (e.g. a composite re-loaded from storage).
    pub fn from_image(image: image::RgbaImage) -> Self {
        let fingerprint = fingerprint_rgba(&image);
        Self { image, fingerprint }
    }

    pub fn image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn size(&self) -> Size {
        Size::of(&self.image)
    }

    /// Content hash over dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn into_image(self) -> image::RgbaImage {
        self.image
    }

    /// PNG bytes of the composite.
    pub fn encode_png(&self) -> PopResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, image::ImageFormat::Png)
            .context("encode composite png")?;
        Ok(out.into_inner())
    }
}

/// Integer pixel rectangle on the design surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Snap a natural-resolution rectangle to the pixel grid, edges rounded independently so that
/// adjacent placements never overlap or gap. Always at least one pixel, clipped to `natural`.
pub(crate) fn snap_to_pixels(placement: &Placement, bounds: &ViewportBounds) -> PopResult<PixelRect> {
    let vs = bounds.scale_for(placement.natural)?;
    let r = vs.to_natural(&placement.rect);
    let max_x = f64::from(placement.natural.width);
    let max_y = f64::from(placement.natural.height);

    let x0 = r.x.round().clamp(0.0, max_x - 1.0);
    let y0 = r.y.round().clamp(0.0, max_y - 1.0);
    let x1 = r.right().round().clamp(x0 + 1.0, max_x);
    let y1 = r.bottom().round().clamp(y0 + 1.0, max_y);
    Ok(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Bake `sticker` into `design` at `placement`.
///
/// The placement must have been made against this design's natural size and lie inside the
/// viewport; the sticker is stretched to the mapped rectangle (aspect is not preserved).
#[tracing::instrument(skip_all, fields(width = design.width(), height = design.height()))]
pub fn compose(
    design: &DesignBitmap,
    sticker: &StickerBitmap,
    placement: &Placement,
    bounds: &ViewportBounds,
) -> PopResult<CompositeImage> {
    let actual = Size::of(design);
    if actual != placement.natural {
        return Err(PopError::CompositeSizeMismatch {
            expected_width: placement.natural.width,
            expected_height: placement.natural.height,
            actual_width: actual.width,
            actual_height: actual.height,
        });
    }
    if sticker.width() == 0 || sticker.height() == 0 {
        return Err(PopError::validation("sticker bitmap is empty"));
    }
    bounds.validate_within(&placement.rect, placement.natural)?;

    let target = snap_to_pixels(placement, bounds)?;
    let scaled = if sticker.dimensions() == (target.width, target.height) {
        sticker.clone()
    } else {
        image::imageops::resize(sticker, target.width, target.height, FilterType::Triangle)
    };

    // Only the covered region goes through premultiplied space; every other design byte is kept.
    let region =
        image::imageops::crop_imm(design, target.x, target.y, target.width, target.height)
            .to_image();
    let mut patch = region.as_raw().clone();
    premultiply_in_place(&mut patch);
    let mut src = scaled.into_raw();
    premultiply_in_place(&mut src);
    over_in_place_at(
        &mut patch,
        target.width,
        target.height,
        &src,
        target.width,
        target.height,
        (0, 0),
    )?;
    demultiply_in_place(&mut patch);
    for ((out, orig), s) in patch
        .chunks_exact_mut(4)
        .zip(region.as_raw().chunks_exact(4))
        .zip(src.chunks_exact(4))
    {
        if s[3] == 0 {
            out.copy_from_slice(orig);
        }
    }

    let patch = image::RgbaImage::from_raw(target.width, target.height, patch)
        .ok_or_else(|| PopError::validation("composite buffer size mismatch"))?;
    let mut image = design.clone();
    image::imageops::replace(&mut image, &patch, i64::from(target.x), i64::from(target.y));
    let out = CompositeImage::from_image(image);
    tracing::debug!(
        x = target.x,
        y = target.y,
        w = target.width,
        h = target.height,
        fingerprint = out.fingerprint,
        "composite built"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
