use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{LinearScale, OhlcBar};
use crate::error::{ChartError, ChartResult};

/// Price units added below the lowest low and above the highest high.
pub const PRICE_DOMAIN_PADDING: f64 = 1.0;

// Past ~1e15 one unit of padding is lost to rounding; pad a few ulps instead.
const PADDING_ULP_FACTOR: f64 = 4.0 * f64::EPSILON;

/// Price axis mapped onto an inverted Y pixel axis (`[plot_height, 0]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScale {
    linear: LinearScale,
}

/// One labelled price-axis tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub price: f64,
    pub pixel_y: f64,
    pub text: String,
}

impl PriceScale {
    /// Creates a scale from an explicit domain. `price_min` must be below `price_max`.
    pub fn new(price_min: f64, price_max: f64, plot_height: f64) -> ChartResult<Self> {
        if !price_min.is_finite() || !price_max.is_finite() || price_min >= price_max {
            return Err(ChartError::InvalidData(
                "price domain must be finite and increasing".to_owned(),
            ));
        }
        if !plot_height.is_finite() || plot_height < 0.0 {
            return Err(ChartError::InvalidData(
                "plot height must be finite and >= 0".to_owned(),
            ));
        }

        Ok(Self {
            linear: LinearScale::new(price_min, price_max, plot_height, 0.0)?,
        })
    }

    /// Fits `[min(low) - 1, max(high) + 1]` over every bar.
    ///
    /// Returns `Ok(None)` for an empty bar set, and when no increasing finite
    /// domain can be formed (lows above highs, or prices near `f64::MAX`).
    pub fn from_bars(bars: &[OhlcBar], plot_height: f64) -> ChartResult<Option<Self>> {
        let Some(low) = bars.iter().map(|bar| OrderedFloat(bar.low)).min() else {
            return Ok(None);
        };
        let Some(high) = bars.iter().map(|bar| OrderedFloat(bar.high)).max() else {
            return Ok(None);
        };

        let (price_min, price_max) = padded_domain(low.0, high.0);
        if !(price_min.is_finite() && price_max.is_finite() && price_min < price_max) {
            warn!(
                low = low.0,
                high = high.0,
                "no usable price domain; nothing to draw"
            );
            return Ok(None);
        }
        Self::new(price_min, price_max, plot_height).map(Some)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.linear.range()
    }

    #[must_use]
    pub fn price_to_pixel(self, price: f64) -> f64 {
        self.linear.map(price)
    }

    #[must_use]
    pub fn pixel_to_price(self, pixel: f64) -> f64 {
        self.linear.invert(pixel)
    }

    /// Round-valued ticks (1, 2 or 5 times a power of ten) inside the domain,
    /// aiming for roughly `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<PriceTick> {
        let (lo, hi) = self.domain();
        let Some(step) = nice_step(lo, hi, count) else {
            return Vec::new();
        };

        let first = (lo / step.size).ceil() as i64;
        let last = (hi / step.size).floor() as i64;
        (first..=last)
            .map(|k| {
                let price = step.value_at(k);
                PriceTick {
                    price,
                    pixel_y: self.price_to_pixel(price),
                    text: format!("{price:.prec$}", prec = step.decimals),
                }
            })
            .collect()
    }
}

/// `[low - 1, high + 1]`, widened when unit padding would round away.
fn padded_domain(low: f64, high: f64) -> (f64, f64) {
    let magnitude = low.abs().max(high.abs());
    let padding = PRICE_DOMAIN_PADDING.max(magnitude * PADDING_ULP_FACTOR);
    (low - padding, high + padding)
}

#[derive(Debug, Clone, Copy)]
struct NiceStep {
    size: f64,
    // For sub-unit steps, `value = k / inverse` avoids accumulating 0.1 * 3 style error.
    inverse: Option<f64>,
    decimals: usize,
}

impl NiceStep {
    fn value_at(self, k: i64) -> f64 {
        match self.inverse {
            Some(inverse) => k as f64 / inverse,
            None => k as f64 * self.size,
        }
    }
}

fn nice_step(lo: f64, hi: f64, count: usize) -> Option<NiceStep> {
    if count == 0 || !(hi > lo) {
        return None;
    }

    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let size = factor * 10f64.powf(power);
    if !size.is_finite() || size <= 0.0 {
        return None;
    }

    let decimals = (-size.log10().floor()).max(0.0) as usize;
    let inverse = (power < 0.0).then(|| 10f64.powf(-power) / factor);
    Some(NiceStep {
        size,
        inverse,
        decimals,
    })
}
