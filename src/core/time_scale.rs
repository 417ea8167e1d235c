use serde::{Deserialize, Serialize};

use crate::core::{LinearScale, OhlcBar, TickLabelPolicy};
use crate::error::{ChartError, ChartResult};

/// Strategy for mapping bars onto the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalScaleMode {
    /// Positions interpolated from timestamps; use when bars may be unevenly spaced.
    Continuous,
    /// One equal-width slot per bar; use for a fixed aggregation cadence.
    #[default]
    Band,
}

/// Timestamp-interpolated horizontal scale. Supports exact inversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousTimeScale {
    linear: LinearScale,
    box_width: f64,
    bar_count: usize,
}

impl ContinuousTimeScale {
    #[must_use]
    pub fn linear(self) -> LinearScale {
        self.linear
    }

    /// `[min(timestamp), max(timestamp)]` in epoch millis.
    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn time_to_pixel(self, timestamp: i64) -> f64 {
        self.linear.map(timestamp as f64)
    }

    #[must_use]
    pub fn pixel_to_time(self, pixel: f64) -> f64 {
        self.linear.invert(pixel)
    }
}

/// Categorical horizontal scale with one slot per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    labels: Vec<String>,
    plot_width: f64,
    box_width: f64,
}

impl BandScale {
    /// One label per bar, in bar order.
    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn index_to_pixel(&self, index: usize) -> f64 {
        index as f64 * self.box_width
    }

    /// Band containing `pixel`, clamped to `[0, bar_count - 1]`.
    #[must_use]
    pub fn index_at(&self, pixel: f64) -> usize {
        let last = self.labels.len().saturating_sub(1);
        if !pixel.is_finite() || pixel <= 0.0 {
            return 0;
        }
        let raw = (pixel / self.box_width).floor();
        if raw >= last as f64 {
            last
        } else {
            raw as usize
        }
    }
}

/// Horizontal mapping built for one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HorizontalScale {
    Continuous(ContinuousTimeScale),
    Band(BandScale),
}

impl HorizontalScale {
    /// Builds the horizontal scale for `bars` over `[0, plot_width]`.
    ///
    /// Returns `Ok(None)` when there is nothing to lay out (no bars or zero
    /// width), so callers never divide by a zero bar count.
    pub fn build(
        mode: HorizontalScaleMode,
        bars: &[OhlcBar],
        plot_width: f64,
        labels: &TickLabelPolicy,
    ) -> ChartResult<Option<Self>> {
        if !plot_width.is_finite() || plot_width < 0.0 {
            return Err(ChartError::InvalidData(
                "plot width must be finite and >= 0".to_owned(),
            ));
        }
        if bars.is_empty() || plot_width == 0.0 {
            return Ok(None);
        }

        let box_width = plot_width / bars.len() as f64;
        let scale = match mode {
            HorizontalScaleMode::Continuous => {
                let (min, max) = bars.iter().fold((i64::MAX, i64::MIN), |(min, max), bar| {
                    (min.min(bar.timestamp), max.max(bar.timestamp))
                });
                Self::Continuous(ContinuousTimeScale {
                    linear: LinearScale::new(min as f64, max as f64, 0.0, plot_width)?,
                    box_width,
                    bar_count: bars.len(),
                })
            }
            HorizontalScaleMode::Band => Self::Band(BandScale {
                labels: bars
                    .iter()
                    .map(|bar| labels.format_timestamp(bar.timestamp))
                    .collect(),
                plot_width,
                box_width,
            }),
        };
        Ok(Some(scale))
    }

    #[must_use]
    pub fn mode(&self) -> HorizontalScaleMode {
        match self {
            Self::Continuous(_) => HorizontalScaleMode::Continuous,
            Self::Band(_) => HorizontalScaleMode::Band,
        }
    }

    #[must_use]
    pub fn bar_count(&self) -> usize {
        match self {
            Self::Continuous(scale) => scale.bar_count,
            Self::Band(scale) => scale.labels.len(),
        }
    }

    /// Pixels allotted to one bar: `plot_width / bar_count`.
    #[must_use]
    pub fn box_width(&self) -> f64 {
        match self {
            Self::Continuous(scale) => scale.box_width,
            Self::Band(scale) => scale.box_width,
        }
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Continuous(scale) => scale.linear.range(),
            Self::Band(scale) => (0.0, scale.plot_width),
        }
    }

    #[must_use]
    pub fn plot_width(&self) -> f64 {
        self.range().1
    }

    /// Left edge of the bar at `index` (band) or its mapped timestamp (continuous).
    #[must_use]
    pub fn bar_x(&self, index: usize, timestamp: i64) -> f64 {
        match self {
            Self::Continuous(scale) => scale.time_to_pixel(timestamp),
            Self::Band(scale) => scale.index_to_pixel(index),
        }
    }

    /// Domain value under `pixel`; only continuous scales invert.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> Option<f64> {
        match self {
            Self::Continuous(scale) => Some(scale.pixel_to_time(pixel)),
            Self::Band(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HorizontalScale, HorizontalScaleMode};
    use crate::core::{Granularity, OhlcBar, TickLabelPolicy};

    fn bars(times: &[i64]) -> Vec<OhlcBar> {
        times
            .iter()
            .map(|t| OhlcBar::new(*t, 10.0, 11.0, 9.0, 10.5).expect("bar"))
            .collect()
    }

    #[test]
    fn empty_input_short_circuits() {
        let policy = TickLabelPolicy::new(Granularity::Minute);
        let scale = HorizontalScale::build(HorizontalScaleMode::Band, &[], 400.0, &policy)
            .expect("build");
        assert!(scale.is_none());
    }

    #[test]
    fn band_index_clamps_to_last_bar() {
        let policy = TickLabelPolicy::new(Granularity::Minute);
        let scale = HorizontalScale::build(
            HorizontalScaleMode::Band,
            &bars(&[0, 60_000, 120_000, 180_000]),
            400.0,
            &policy,
        )
        .expect("build")
        .expect("scale");

        let HorizontalScale::Band(band) = scale else {
            panic!("expected band scale");
        };
        assert_eq!(band.index_at(0.0), 0);
        assert_eq!(band.index_at(99.9), 0);
        assert_eq!(band.index_at(100.0), 1);
        assert_eq!(band.index_at(400.0), 3);
        assert_eq!(band.index_at(10_000.0), 3);
        assert_eq!(band.index_at(-5.0), 0);
    }

    #[test]
    fn continuous_scale_spans_timestamp_extent() {
        let policy = TickLabelPolicy::new(Granularity::Minute);
        let scale = HorizontalScale::build(
            HorizontalScaleMode::Continuous,
            &bars(&[1_000, 3_000, 5_000]),
            200.0,
            &policy,
        )
        .expect("build")
        .expect("scale");

        assert_eq!(scale.bar_x(0, 1_000), 0.0);
        assert_eq!(scale.bar_x(1, 3_000), 100.0);
        assert_eq!(scale.bar_x(2, 5_000), 200.0);
        assert_eq!(scale.invert(50.0), Some(2_000.0));
    }
}
