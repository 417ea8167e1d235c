use tracing::{debug, trace};

use crate::core::{
    AggregatesPayload, CandleGeometry, Granularity, HorizontalScaleMode, OhlcBar, RawBar,
    TickLabel, Viewport, canonicalize_bars, normalize_bars,
};
use crate::error::ChartResult;
use crate::interaction::{CrosshairPhase, CrosshairState, InteractionState, PointerEvent, Tooltip};
use crate::render::{RenderFrame, Renderer};

use super::render_frame_builder::build_render_frame;
use super::{ChartEngineConfig, ChartLayout, EngineSnapshot, ViewportResizeAdapter};

/// Main orchestration facade consumed by host applications.
///
/// Every data, viewport or configuration change runs a full synchronous
/// recompute before returning, so pointer events always resolve against the
/// most recently committed layout.
pub struct ChartEngine<R: Renderer> {
    renderer: R,
    config: ChartEngineConfig,
    bars: Vec<OhlcBar>,
    adapter: ViewportResizeAdapter,
    interaction: InteractionState,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        let mut adapter = ViewportResizeAdapter::new();
        adapter.observe(config.viewport)?;

        let mut engine = Self {
            renderer,
            config,
            bars: Vec::new(),
            adapter,
            interaction: InteractionState::default(),
        };
        engine.recompute()?;
        Ok(engine)
    }

    #[must_use]
    pub fn config(&self) -> ChartEngineConfig {
        self.config
    }

    /// Replaces bars with wire-form input, dropping malformed entries.
    pub fn set_raw_bars(&mut self, raw: Vec<RawBar>) -> ChartResult<()> {
        let original_count = raw.len();
        self.bars = normalize_bars(raw);
        debug!(
            original_count,
            canonical_count = self.bars.len(),
            "set raw bars"
        );
        self.recompute()
    }

    /// Replaces bars with typed input, sorted and deduplicated by timestamp.
    pub fn set_bars(&mut self, bars: Vec<OhlcBar>) -> ChartResult<()> {
        let original_count = bars.len();
        self.bars = canonicalize_bars(bars);
        debug!(original_count, canonical_count = self.bars.len(), "set bars");
        self.recompute()
    }

    /// Loads an aggregates response body; returns the number of bars kept.
    pub fn load_aggregates_json(&mut self, input: &str) -> ChartResult<usize> {
        let payload = AggregatesPayload::from_json_str(input)?;
        self.set_raw_bars(payload.results)?;
        Ok(self.bars.len())
    }

    #[must_use]
    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    /// Reports a new measured surface size, keeping the configured margins.
    ///
    /// Returns `true` when the size changed and a recompute ran.
    pub fn resize(&mut self, width: f64, height: f64) -> ChartResult<bool> {
        let viewport = Viewport {
            width,
            height,
            ..self.config.viewport
        };
        self.set_viewport(viewport)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<bool> {
        if !self.adapter.observe(viewport)? {
            return Ok(false);
        }
        self.config.viewport = viewport;
        self.recompute()?;
        Ok(true)
    }

    pub fn set_scale_mode(&mut self, mode: HorizontalScaleMode) -> ChartResult<()> {
        self.config.scale_mode = mode;
        self.recompute()
    }

    pub fn set_granularity(&mut self, granularity: Granularity) -> ChartResult<()> {
        self.config.granularity = granularity;
        self.recompute()
    }

    pub fn set_utc_offset_minutes(&mut self, minutes: i32) -> ChartResult<()> {
        let config = self.config.with_utc_offset_minutes(minutes).validate()?;
        self.config = config;
        self.recompute()
    }

    /// Committed layout, or `None` in the "nothing to draw" state.
    #[must_use]
    pub fn layout(&self) -> Option<&ChartLayout> {
        self.adapter.layout()
    }

    #[must_use]
    pub fn layout_generation(&self) -> u64 {
        self.adapter.generation()
    }

    #[must_use]
    pub fn candles(&self) -> &[CandleGeometry] {
        self.layout()
            .map(|layout| layout.candles.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn tick_labels(&self) -> &[TickLabel] {
        self.layout()
            .map(|layout| layout.tick_labels.as_slice())
            .unwrap_or(&[])
    }

    /// Pixel width per bar, when something is laid out.
    #[must_use]
    pub fn box_width(&self) -> Option<f64> {
        self.layout().map(ChartLayout::box_width)
    }

    #[must_use]
    pub fn map_price_to_pixel(&self, price: f64) -> Option<f64> {
        self.layout().map(|layout| layout.price.price_to_pixel(price))
    }

    #[must_use]
    pub fn price_domain(&self) -> Option<(f64, f64)> {
        self.layout().map(|layout| layout.price.domain())
    }

    /// Plot-local x of the bar at `index`, as used for its candle body.
    #[must_use]
    pub fn bar_x(&self, index: usize) -> Option<f64> {
        let layout = self.layout()?;
        let bar = layout.bars.get(index)?;
        Some(layout.horizontal.bar_x(index, bar.timestamp))
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> CrosshairPhase {
        trace!(?event, "pointer event");
        let locator = self.adapter.layout().map(ChartLayout::locator);
        self.interaction.handle(event, locator.as_ref())
    }

    pub fn pointer_enter(&mut self, x: f64, y: f64) -> CrosshairPhase {
        self.handle_pointer(PointerEvent::Enter { x, y })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> CrosshairPhase {
        self.handle_pointer(PointerEvent::Move { x, y })
    }

    pub fn pointer_leave(&mut self) -> CrosshairPhase {
        self.handle_pointer(PointerEvent::Leave)
    }

    #[must_use]
    pub fn crosshair_state(&self) -> CrosshairState {
        self.interaction.crosshair()
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<Tooltip> {
        self.interaction.tooltip()
    }

    #[must_use]
    pub fn render_frame(&self) -> RenderFrame {
        build_render_frame(
            self.config.viewport,
            self.adapter.layout(),
            &self.interaction.crosshair(),
        )
    }

    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.render_frame();
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let crosshair = self.interaction.crosshair();
        EngineSnapshot {
            config: self.config,
            viewport: self.adapter.viewport(),
            layout_generation: self.adapter.generation(),
            bars: self.bars.clone(),
            box_width: self.box_width(),
            candles: self.candles().to_vec(),
            tick_labels: self.tick_labels().to_vec(),
            crosshair_phase: crosshair.phase,
            tooltip: crosshair.tooltip,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn recompute(&mut self) -> ChartResult<()> {
        let result = self
            .adapter
            .recompute(&self.bars, self.config.layout_options())
            .map(|layout| layout.is_some());
        // Pointer state follows whatever got committed, including nothing.
        let locator = self.adapter.layout().map(ChartLayout::locator);
        self.interaction.relocate(locator.as_ref());

        let has_layout = result?;
        debug!(
            generation = self.adapter.generation(),
            has_layout,
            bar_count = self.bars.len(),
            "recompute committed"
        );
        Ok(())
    }
}
