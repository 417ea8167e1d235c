use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    CandleGeometry, HorizontalScale, HorizontalScaleMode, OhlcBar, PlotArea, PriceScale,
    PriceTick, TickLabel, TickLabelPolicy, Viewport, compile_candles,
};
use crate::error::ChartResult;
use crate::interaction::CrosshairLocator;

/// Inputs of the layout pipeline other than bars and viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub scale_mode: HorizontalScaleMode,
    pub label_policy: TickLabelPolicy,
    pub price_axis_tick_count: usize,
}

/// Everything computed for one render cycle: scales, labels and geometry.
///
/// A layout is immutable once committed and is replaced wholesale on the next
/// recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub viewport: Viewport,
    pub plot: PlotArea,
    pub bars: Vec<OhlcBar>,
    pub horizontal: HorizontalScale,
    pub price: PriceScale,
    pub tick_labels: Vec<TickLabel>,
    pub price_ticks: Vec<PriceTick>,
    pub candles: Vec<CandleGeometry>,
}

impl ChartLayout {
    /// Runs scales, then labels, then geometry.
    ///
    /// Returns `Ok(None)` for the "nothing to draw" cases: no bars, or a
    /// viewport whose plot area is empty. Neither compiler runs in that case.
    pub fn compute(
        bars: &[OhlcBar],
        viewport: Viewport,
        options: LayoutOptions,
    ) -> ChartResult<Option<Self>> {
        let viewport = viewport.validate()?;
        let label_policy = options.label_policy.validate()?;
        let plot = viewport.plot_area();
        if bars.is_empty() || plot.is_empty() {
            return Ok(None);
        }

        let Some(horizontal) =
            HorizontalScale::build(options.scale_mode, bars, plot.width, &label_policy)?
        else {
            return Ok(None);
        };
        let Some(price) = PriceScale::from_bars(bars, plot.height)? else {
            return Ok(None);
        };

        let tick_labels = label_policy.build_tick_labels(bars, &horizontal);
        let price_ticks = price.ticks(options.price_axis_tick_count);
        let candles = compile_candles(bars, &horizontal, &price);

        debug!(
            bar_count = bars.len(),
            candle_count = candles.len(),
            box_width = horizontal.box_width(),
            plot_width = plot.width,
            plot_height = plot.height,
            "computed chart layout"
        );

        Ok(Some(Self {
            viewport,
            plot,
            bars: bars.to_vec(),
            horizontal,
            price,
            tick_labels,
            price_ticks,
            candles,
        }))
    }

    #[must_use]
    pub fn box_width(&self) -> f64 {
        self.horizontal.box_width()
    }

    /// Locator bound to this layout's scales and bars.
    #[must_use]
    pub fn locator(&self) -> CrosshairLocator<'_> {
        CrosshairLocator::new(&self.bars, &self.horizontal, self.price)
    }
}
