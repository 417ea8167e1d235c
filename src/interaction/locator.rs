use serde::{Deserialize, Serialize};

use crate::core::{HorizontalScale, OhlcBar, PriceScale, candle_center_x};

/// Pixel round trips move a timestamp by a few ulps of the larger of the
/// timestamps' magnitude and their span; lookups snap back within this factor.
const SNAP_ULP_FACTOR: f64 = 8.0 * f64::EPSILON;

/// Bar under the pointer plus the crosshair line positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub index: usize,
    pub bar: OhlcBar,
    /// Plot-local x of the vertical crosshair line (the candle center).
    pub pixel_x: f64,
    /// Plot-local y of the horizontal crosshair line (`price_to_pixel(close)`).
    pub pixel_y: f64,
}

/// Maps pointer positions to the nearest bar against one committed scale set.
#[derive(Debug, Clone, Copy)]
pub struct CrosshairLocator<'a> {
    bars: &'a [OhlcBar],
    horizontal: &'a HorizontalScale,
    price: PriceScale,
}

impl<'a> CrosshairLocator<'a> {
    #[must_use]
    pub fn new(bars: &'a [OhlcBar], horizontal: &'a HorizontalScale, price: PriceScale) -> Self {
        Self {
            bars,
            horizontal,
            price,
        }
    }

    #[must_use]
    pub fn plot_width(&self) -> f64 {
        self.horizontal.plot_width()
    }

    /// `true` when `x` lies within `[0, plot_width]`.
    #[must_use]
    pub fn contains_x(&self, x: f64) -> bool {
        x.is_finite() && (0.0..=self.plot_width()).contains(&x)
    }

    /// Index of the bar nearest to `pointer_x`, clamping the pointer into the plot first.
    #[must_use]
    pub fn nearest_index(&self, pointer_x: f64) -> Option<usize> {
        if self.bars.is_empty() || pointer_x.is_nan() {
            return None;
        }
        let x = pointer_x.clamp(0.0, self.plot_width());
        let index = match self.horizontal {
            HorizontalScale::Continuous(scale) => self.index_at_time(scale.pixel_to_time(x)),
            HorizontalScale::Band(scale) => scale.index_at(x),
        };
        Some(index.min(self.bars.len() - 1))
    }

    /// Left bisection over timestamps: the first bar with `timestamp >= value`.
    ///
    /// A value a few ulps past a bar's own timestamp resolves to that bar.
    /// Values past the last bar resolve to the last bar.
    #[must_use]
    pub fn index_at_time(&self, value: f64) -> usize {
        let (Some(first), Some(last)) = (self.bars.first(), self.bars.last()) else {
            return 0;
        };
        let (first, last) = (first.timestamp as f64, last.timestamp as f64);
        let snap = first.abs().max(last.abs()).max(last - first) * SNAP_ULP_FACTOR;

        let mut index = self
            .bars
            .partition_point(|bar| (bar.timestamp as f64) < value);
        if index > 0 && value - self.bars[index - 1].timestamp as f64 <= snap {
            index -= 1;
        }
        index.min(self.bars.len() - 1)
    }

    /// Tooltip for the bar under `pointer_x`, or `None` when the pointer is
    /// horizontally outside the plot.
    #[must_use]
    pub fn locate(&self, pointer_x: f64) -> Option<Tooltip> {
        if !self.contains_x(pointer_x) {
            return None;
        }
        self.nearest_index(pointer_x)
            .and_then(|index| self.tooltip_for(index))
    }

    #[must_use]
    pub fn tooltip_for(&self, index: usize) -> Option<Tooltip> {
        let bar = *self.bars.get(index)?;
        let x = self.horizontal.bar_x(index, bar.timestamp);
        Some(Tooltip {
            index,
            bar,
            pixel_x: candle_center_x(x, self.horizontal.box_width()),
            pixel_y: self.price.price_to_pixel(bar.close),
        })
    }
}
