use rayon::prelude::*;

use crate::foundation::error::{PopError, PopResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = src[i].saturating_add(dc);
    }
    out
}

/// Draw a premultiplied `src` image over `dst` with its top-left at `origin`, clipped to `dst`.
///
/// Rows are blended in parallel; the result does not depend on scheduling.
pub fn over_in_place_at(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    origin: (u32, u32),
) -> PopResult<()> {
    let dst_len = (dst_width as usize) * (dst_height as usize) * 4;
    let src_len = (src_width as usize) * (src_height as usize) * 4;
    if dst.len() != dst_len || src.len() != src_len {
        return Err(PopError::validation(
            "over_in_place_at expects buffers matching width*height*4",
        ));
    }

    let (ox, oy) = origin;
    if ox >= dst_width || oy >= dst_height || src_width == 0 || src_height == 0 {
        return Ok(());
    }
    let cols = src_width.min(dst_width - ox) as usize;
    let rows = src_height.min(dst_height - oy) as usize;
    let dst_stride = dst_width as usize * 4;
    let src_stride = src_width as usize * 4;

    dst.par_chunks_exact_mut(dst_stride)
        .skip(oy as usize)
        .take(rows)
        .enumerate()
        .for_each(|(sy, dst_row)| {
            let src_row = &src[sy * src_stride..sy * src_stride + cols * 4];
            let start = ox as usize * 4;
            let dst_span = &mut dst_row[start..start + cols * 4];
            for (d, s) in dst_span.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
