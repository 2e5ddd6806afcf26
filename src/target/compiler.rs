use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail, ensure};
use image::imageops::FilterType;

use crate::composite::compositor::CompositeImage;

/// Cooperative cancellation flag shared between a compile job and its worker.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// External image-target compiler capability.
///
/// Implementations must be deterministic for identical input and should poll `cancel` between
/// expensive steps; a cancelled compile may return any error.
pub trait TargetCompiler: Send + Sync {
    fn compile_image_targets(
        &self,
        images: &[image::RgbaImage],
        cancel: &CancelToken,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Opaque tracker data derived from one composite. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledTarget {
    bytes: Arc<[u8]>,
    source_fingerprint: u64,
}

impl CompiledTarget {
    pub fn new(bytes: impl Into<Arc<[u8]>>, source_fingerprint: u64) -> Self {
        Self {
            bytes: bytes.into(),
            source_fingerprint,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fingerprint of the composite this target was compiled from.
    pub fn source_fingerprint(&self) -> u64 {
        self.source_fingerprint
    }

    /// Whether this target was compiled from `composite`.
    pub fn matches(&self, composite: &CompositeImage) -> bool {
        self.source_fingerprint == composite.fingerprint()
    }
}

const PYRAMID_MAGIC: &[u8; 4] = b"PMTG";
const PYRAMID_VERSION: u8 = 1;

/// Reference compiler: a grayscale image pyramid behind a versioned header.
///
/// Layout (little endian): magic `PMTG`, version `u8`, image count `u32`, then per image a level
/// count `u32` followed by `width u32, height u32, width*height luma bytes` per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PyramidCompiler {
    /// Maximum number of levels per image (including the full-resolution level).
    pub max_levels: u32,
    /// Levels stop once either side would drop below this.
    pub min_side: u32,
}

impl Default for PyramidCompiler {
    fn default() -> Self {
        Self {
            max_levels: 4,
            min_side: 16,
        }
    }
}

/// Dimensions recorded in a pyramid target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PyramidInfo {
    /// Per image, the `(width, height)` of each level from largest to smallest.
    pub images: Vec<Vec<(u32, u32)>>,
}

impl PyramidCompiler {
    /// Parse and check a target produced by this compiler.
    pub fn inspect(bytes: &[u8]) -> anyhow::Result<PyramidInfo> {
        let mut r = Reader { buf: bytes, pos: 0 };
        ensure!(r.take(4)? == PYRAMID_MAGIC, "not a pyramid target");
        let version = r.take(1)?[0];
        ensure!(
            version == PYRAMID_VERSION,
            "unsupported pyramid version {version}"
        );
        let count = r.u32()?;
        let mut images = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let levels = r.u32()?;
            let mut dims = Vec::with_capacity(levels.min(32) as usize);
            for _ in 0..levels {
                let (w, h) = (r.u32()?, r.u32()?);
                r.take((w as usize) * (h as usize))?;
                dims.push((w, h));
            }
            images.push(dims);
        }
        ensure!(r.pos == bytes.len(), "trailing bytes after pyramid data");
        Ok(PyramidInfo { images })
    }
}

impl TargetCompiler for PyramidCompiler {
    fn compile_image_targets(
        &self,
        images: &[image::RgbaImage],
        cancel: &CancelToken,
    ) -> anyhow::Result<Vec<u8>> {
        ensure!(!images.is_empty(), "no images to compile");
        let count = u32::try_from(images.len()).context("too many images")?;

        let mut out = Vec::new();
        out.extend_from_slice(PYRAMID_MAGIC);
        out.push(PYRAMID_VERSION);
        out.extend_from_slice(&count.to_le_bytes());

        for img in images {
            ensure!(img.width() > 0 && img.height() > 0, "empty image");
            let mut level = image::imageops::grayscale(img);
            let mut levels = Vec::new();
            loop {
                if cancel.is_cancelled() {
                    bail!("compile cancelled");
                }
                let (w, h) = level.dimensions();
                let next = (w / 2, h / 2);
                levels.push(level);
                if levels.len() as u32 >= self.max_levels.max(1)
                    || next.0 < self.min_side
                    || next.1 < self.min_side
                {
                    break;
                }
                level = image::imageops::resize(
                    levels.last().context("pyramid level")?,
                    next.0,
                    next.1,
                    FilterType::Triangle,
                );
            }

            out.extend_from_slice(&(levels.len() as u32).to_le_bytes());
            for l in &levels {
                out.extend_from_slice(&l.width().to_le_bytes());
                out.extend_from_slice(&l.height().to_le_bytes());
                out.extend_from_slice(l.as_raw());
            }
        }
        Ok(out)
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> anyhow::Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&e| e <= self.buf.len())
            .context("truncated pyramid data")?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u32(&mut self) -> anyhow::Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/target/compiler.rs"]
mod tests;
