use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::core::{HorizontalScale, PriceScale};
use crate::error::{ChartError, ChartResult};

/// Horizontal gap left between neighbouring candle bodies, in pixels.
pub const CANDLE_GUTTER_PX: f64 = 2.0;

/// Smallest body height a renderer should paint so flat candles stay visible.
pub const MIN_RENDERED_BODY_HEIGHT_PX: f64 = 1.0;

/// One aggregated price record over a time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    /// Bucket start in epoch milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// Builds a validated bar.
    ///
    /// Invariants:
    /// - all prices are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> ChartResult<Self> {
        let bar = Self {
            timestamp,
            open,
            high,
            low,
            close,
        };
        bar.validate()?;
        Ok(bar)
    }

    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_millis(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        )
    }

    /// Builds a bar checking only that prices are finite and `low <= high`.
    ///
    /// Used for producer data: an `open` or `close` outside `[low, high]` is
    /// still drawable and is kept rather than dropped.
    pub fn lenient(
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> ChartResult<Self> {
        let bar = Self {
            timestamp,
            open,
            high,
            low,
            close,
        };
        bar.validate_drawable()?;
        Ok(bar)
    }

    /// Finite prices with `low <= high`; the minimum needed for a wick and a price domain.
    pub fn validate_drawable(self) -> ChartResult<()> {
        self.validate_finite()?;
        if self.low > self.high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn validate_finite(self) -> ChartResult<()> {
        if !self.open.is_finite()
            || !self.high.is_finite()
            || !self.low.is_finite()
            || !self.close.is_finite()
        {
            return Err(ChartError::InvalidData(
                "ohlc values must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn validate(self) -> ChartResult<()> {
        self.validate_drawable()?;
        if self.open < self.low
            || self.open > self.high
            || self.close < self.low
            || self.close > self.high
        {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }
        Ok(())
    }

    /// `true` when `low <= open, close <= high`.
    #[must_use]
    pub fn is_well_ordered(self) -> bool {
        self.validate().is_ok()
    }

    #[must_use]
    pub fn sentiment(self) -> Sentiment {
        if self.open > self.close {
            Sentiment::Bearish
        } else {
            Sentiment::Bullish
        }
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.sentiment() == Sentiment::Bullish
    }
}

/// Candle direction. Bearish candles paint solid, bullish candles hollow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
}

/// Drawable primitives for one bar, in plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub index: usize,
    pub body_x: f64,
    pub body_y: f64,
    pub body_width: f64,
    /// Exact body height; zero for doji bars. See [`Self::rendered_body_height`].
    pub body_height: f64,
    pub wick_x: f64,
    /// Pixel y of the low price.
    pub wick_y1: f64,
    /// Pixel y of the high price.
    pub wick_y2: f64,
    pub sentiment: Sentiment,
}

impl CandleGeometry {
    /// Body height clamped so an `open == close` bar still draws a flat segment.
    #[must_use]
    pub fn rendered_body_height(self) -> f64 {
        self.body_height.max(MIN_RENDERED_BODY_HEIGHT_PX)
    }
}

/// Body width for a slot of `box_width` pixels once the gutter is removed.
#[must_use]
pub fn body_width_for(box_width: f64) -> f64 {
    (box_width - CANDLE_GUTTER_PX).max(0.0)
}

/// Horizontal center of a candle anchored at `x`; wicks, tick marks and the
/// crosshair's vertical line all sit here.
#[must_use]
pub fn candle_center_x(x: f64, box_width: f64) -> f64 {
    x + body_width_for(box_width) / 2.0
}

/// Compiles every bar into candle geometry.
///
/// Pure and allocation-only: the output is rebuilt from scratch on every
/// recompute and has exactly one entry per input bar.
#[must_use]
pub fn compile_candles(
    bars: &[OhlcBar],
    horizontal: &HorizontalScale,
    price: &PriceScale,
) -> Vec<CandleGeometry> {
    #[cfg(feature = "parallel-projection")]
    {
        bars.par_iter()
            .enumerate()
            .map(|(index, bar)| compile_single_candle(index, *bar, horizontal, price))
            .collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        bars.iter()
            .enumerate()
            .map(|(index, bar)| compile_single_candle(index, *bar, horizontal, price))
            .collect()
    }
}

fn compile_single_candle(
    index: usize,
    bar: OhlcBar,
    horizontal: &HorizontalScale,
    price: &PriceScale,
) -> CandleGeometry {
    let box_width = horizontal.box_width();
    let x = horizontal.bar_x(index, bar.timestamp);
    let open_y = price.price_to_pixel(bar.open);
    let close_y = price.price_to_pixel(bar.close);

    CandleGeometry {
        index,
        body_x: x,
        body_y: price.price_to_pixel(bar.open.max(bar.close)),
        body_width: body_width_for(box_width),
        body_height: (open_y - close_y).abs(),
        wick_x: candle_center_x(x, box_width),
        wick_y1: price.price_to_pixel(bar.low),
        wick_y2: price.price_to_pixel(bar.high),
        sentiment: bar.sentiment(),
    }
}
