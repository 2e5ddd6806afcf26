use std::sync::Arc;

use crate::composite::compositor::{CompositeImage, compose};
use crate::foundation::config::PipelineConfig;
use crate::foundation::core::{DesignBitmap, MarkerBitmap, Size, StickerBitmap};
use crate::foundation::error::{PopError, PopResult};
use crate::frame::layout::StickerMetrics;
use crate::frame::render::render_sticker;
use crate::frame::spec::FrameSpec;
use crate::mapping::viewport::{Placement, PlacementRect, ViewportBounds};
use crate::target::compiler::CompiledTarget;
use crate::target::job::{CompileJob, TargetCompilerAdapter};

/// A composite and the target compiled from it.
#[derive(Clone, Debug)]
pub struct ComposeOutput {
    pub composite: Arc<CompositeImage>,
    pub target: CompiledTarget,
}

/// Bake the sticker into the design and compile the result, blocking until the compile finishes.
#[tracing::instrument(skip_all)]
pub fn compose_and_compile(
    design: &DesignBitmap,
    sticker: &StickerBitmap,
    placement: &Placement,
    bounds: &ViewportBounds,
    adapter: &TargetCompilerAdapter,
) -> PopResult<ComposeOutput> {
    let composite = Arc::new(compose(design, sticker, placement, bounds)?);
    let target = adapter.compile(&composite)?;
    Ok(ComposeOutput { composite, target })
}

/// Editor state for one campaign design.
///
/// Every edit either applies fully or returns an error and leaves the draft as it was. Edits that
/// change what would be composited drop the current composite and target; compile results for
/// anything but the current composite are discarded.
pub struct DesignDraft {
    metrics: StickerMetrics,
    bounds: ViewportBounds,
    frame: FrameSpec,
    marker: Option<MarkerBitmap>,
    sticker: Option<StickerBitmap>,
    design: Option<DesignBitmap>,
    placement: Option<Placement>,
    composite: Option<Arc<CompositeImage>>,
    target: Option<CompiledTarget>,
    job: Option<CompileJob>,
}

impl DesignDraft {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            metrics: config.sticker_metrics(),
            bounds: config.viewport_bounds(),
            frame: FrameSpec::default(),
            marker: None,
            sticker: None,
            design: None,
            placement: None,
            composite: None,
            target: None,
            job: None,
        }
    }

    pub fn frame(&self) -> &FrameSpec {
        &self.frame
    }

    pub fn sticker(&self) -> Option<&StickerBitmap> {
        self.sticker.as_ref()
    }

    pub fn design_size(&self) -> Option<Size> {
        self.design.as_ref().map(Size::of)
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn composite(&self) -> Option<&Arc<CompositeImage>> {
        self.composite.as_ref()
    }

    pub fn target(&self) -> Option<&CompiledTarget> {
        self.target.as_ref()
    }

    pub fn is_compiling(&self) -> bool {
        self.job.is_some()
    }

    pub fn bounds(&self) -> &ViewportBounds {
        &self.bounds
    }

    /// Use a new marker bitmap, re-rendering the sticker with the current frame.
    pub fn set_marker(&mut self, marker: MarkerBitmap) -> PopResult<()> {
        let sticker = render_sticker(&marker, &self.frame, &self.metrics)?;
        self.marker = Some(marker);
        self.replace_sticker(sticker);
        Ok(())
    }

    /// Change the frame. Without a marker the spec is only validated and stored.
    pub fn set_frame(&mut self, frame: FrameSpec) -> PopResult<()> {
        match &self.marker {
            Some(marker) => {
                let sticker = render_sticker(marker, &frame, &self.metrics)?;
                self.frame = frame;
                self.replace_sticker(sticker);
            }
            None => {
                frame.validate()?;
                self.frame = frame;
            }
        }
        Ok(())
    }

    /// Replace the design. A placement made against other dimensions is re-centred.
    pub fn set_design(&mut self, design: DesignBitmap) -> PopResult<()> {
        let natural = Size::new(design.width(), design.height())?;
        let placement = match self.placement {
            Some(p) if p.natural == natural => p,
            _ => Placement {
                rect: self.bounds.centered_default(natural, self.sticker_aspect())?,
                natural,
            },
        };
        self.design = Some(design);
        self.placement = Some(placement);
        self.invalidate();
        Ok(())
    }

    /// Place the sticker at `rect` (viewport pixels).
    pub fn place(&mut self, rect: PlacementRect) -> PopResult<()> {
        let natural = self.require_natural()?;
        self.bounds.validate_within(&rect, natural)?;
        self.set_placement(Placement { rect, natural });
        Ok(())
    }

    /// Drag the placement, clamped to the viewport.
    pub fn nudge(&mut self, dx: f64, dy: f64) -> PopResult<()> {
        let current = self.require_placement()?;
        let rect = self
            .bounds
            .translate_clamped(&current.rect, dx, dy, current.natural)?;
        self.set_placement(Placement { rect, ..current });
        Ok(())
    }

    /// Resize the placement, clamped to the minimum size and the viewport.
    pub fn resize(&mut self, width: f64, height: f64) -> PopResult<()> {
        let current = self.require_placement()?;
        let rect = self
            .bounds
            .resize_clamped(&current.rect, width, height, current.natural)?;
        self.set_placement(Placement { rect, ..current });
        Ok(())
    }

    /// Build (or reuse) the composite for the current sticker, design and placement.
    pub fn compose(&mut self) -> PopResult<Arc<CompositeImage>> {
        if let Some(c) = &self.composite {
            return Ok(Arc::clone(c));
        }
        let sticker = self
            .sticker
            .as_ref()
            .ok_or_else(|| PopError::validation("no sticker: set a marker first"))?;
        let design = self
            .design
            .as_ref()
            .ok_or_else(|| PopError::validation("no design loaded"))?;
        let placement = self.require_placement()?;

        let composite = Arc::new(compose(design, sticker, &placement, &self.bounds)?);
        self.composite = Some(Arc::clone(&composite));
        Ok(composite)
    }

    /// Compose if needed and start compiling in the background.
    pub fn start_compile(&mut self, adapter: &TargetCompilerAdapter) -> PopResult<()> {
        let composite = self.compose()?;
        if self.target.as_ref().is_some_and(|t| t.matches(&composite)) {
            return Ok(());
        }
        if let Some(mut old) = self.job.take() {
            old.cancel();
        }
        self.job = Some(adapter.spawn(composite)?);
        Ok(())
    }

    /// Check the background compile. `None` while it runs or when nothing is compiling.
    pub fn poll_compile(&mut self) -> Option<PopResult<CompiledTarget>> {
        let res = self.job.as_mut()?.poll()?;
        self.job = None;
        match res {
            Ok(target) => {
                if self.accept_target(target.clone()) {
                    Some(Ok(target))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Block on the background compile.
    pub fn wait_compile(&mut self) -> PopResult<CompiledTarget> {
        let mut job = self
            .job
            .take()
            .ok_or_else(|| PopError::validation("no compile in progress"))?;
        let target = job.wait()?;
        if self.accept_target(target.clone()) {
            Ok(target)
        } else {
            Err(PopError::target_compile(
                "composite changed while compiling",
            ))
        }
    }

    /// Install a compile result. Returns `false` (and drops it) when it belongs to another
    /// composite.
    pub fn accept_target(&mut self, target: CompiledTarget) -> bool {
        match &self.composite {
            Some(c) if target.matches(c) => {
                self.target = Some(target);
                true
            }
            _ => {
                tracing::debug!(
                    fingerprint = target.source_fingerprint(),
                    "stale compile result discarded"
                );
                false
            }
        }
    }

    fn sticker_aspect(&self) -> f64 {
        match &self.sticker {
            Some(s) => f64::from(s.width()) / f64::from(s.height()),
            None => 1.0,
        }
    }

    fn require_natural(&self) -> PopResult<Size> {
        self.design_size()
            .ok_or_else(|| PopError::validation("no design loaded"))
    }

    fn require_placement(&self) -> PopResult<Placement> {
        self.placement
            .ok_or_else(|| PopError::validation("sticker has not been placed"))
    }

    fn replace_sticker(&mut self, sticker: StickerBitmap) {
        if self.sticker.as_ref() != Some(&sticker) {
            self.sticker = Some(sticker);
            self.invalidate();
        }
    }

    fn set_placement(&mut self, placement: Placement) {
        if self.placement != Some(placement) {
            self.placement = Some(placement);
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.composite = None;
        self.target = None;
        if let Some(mut job) = self.job.take() {
            job.cancel();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/authoring/draft.rs"]
mod tests;
