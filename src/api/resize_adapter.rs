use tracing::{debug, trace};

use crate::core::{OhlcBar, Viewport};
use crate::error::ChartResult;

use super::{ChartLayout, LayoutOptions};

/// Tracks the measured surface size and owns the committed layout.
///
/// Size detection itself belongs to the host; it reports every measurement
/// through [`Self::observe`]. Any recompute discards the previous layout.
#[derive(Debug, Clone, Default)]
pub struct ViewportResizeAdapter {
    viewport: Option<Viewport>,
    layout: Option<ChartLayout>,
    generation: u64,
}

impl ViewportResizeAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Records a measurement; returns `true` when it differs from the last one.
    pub fn observe(&mut self, viewport: Viewport) -> ChartResult<bool> {
        let viewport = viewport.validate()?;
        if self.viewport == Some(viewport) {
            trace!(width = viewport.width, height = viewport.height, "viewport unchanged");
            return Ok(false);
        }
        self.viewport = Some(viewport);
        Ok(true)
    }

    /// Rebuilds the layout from scratch for the current viewport.
    ///
    /// A missing or zero-area viewport commits no layout and never reaches the
    /// scale or geometry builders.
    pub fn recompute(
        &mut self,
        bars: &[OhlcBar],
        options: LayoutOptions,
    ) -> ChartResult<Option<&ChartLayout>> {
        self.layout = None;
        self.generation += 1;

        let Some(viewport) = self.viewport else {
            return Ok(None);
        };
        if viewport.plot_area().is_empty() {
            debug!(
                width = viewport.width,
                height = viewport.height,
                "viewport has no plot area; awaiting resize"
            );
            return Ok(None);
        }

        self.layout = ChartLayout::compute(bars, viewport, options)?;
        Ok(self.layout.as_ref())
    }

    #[must_use]
    pub fn layout(&self) -> Option<&ChartLayout> {
        self.layout.as_ref()
    }

    /// Number of recomputes so far; bumps even when nothing was drawn.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
