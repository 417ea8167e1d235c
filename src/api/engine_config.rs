use serde::{Deserialize, Serialize};

use crate::core::{Granularity, HorizontalScaleMode, TickLabelPolicy, Viewport};
use crate::error::{ChartError, ChartResult};

use super::LayoutOptions;

pub const DEFAULT_PRICE_AXIS_TICK_COUNT: usize = 10;

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist chart setup alongside their own state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub scale_mode: HorizontalScaleMode,
    #[serde(default)]
    pub granularity: Granularity,
    /// Timezone shift applied to time label text.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_price_axis_tick_count")]
    pub price_axis_tick_count: usize,
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            scale_mode: HorizontalScaleMode::default(),
            granularity: Granularity::default(),
            utc_offset_minutes: 0,
            price_axis_tick_count: DEFAULT_PRICE_AXIS_TICK_COUNT,
        }
    }

    #[must_use]
    pub fn with_scale_mode(mut self, scale_mode: HorizontalScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_price_axis_tick_count(mut self, count: usize) -> Self {
        self.price_axis_tick_count = count;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        self.viewport.validate()?;
        self.label_policy().validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn label_policy(self) -> TickLabelPolicy {
        TickLabelPolicy::new(self.granularity).with_utc_offset_minutes(self.utc_offset_minutes)
    }

    #[must_use]
    pub fn layout_options(self) -> LayoutOptions {
        LayoutOptions {
            scale_mode: self.scale_mode,
            label_policy: self.label_policy(),
            price_axis_tick_count: self.price_axis_tick_count,
        }
    }

    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(ChartError::json("failed to serialize engine config"))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(ChartError::json("failed to parse engine config"))?;
        config.validate()
    }
}

fn default_price_axis_tick_count() -> usize {
    DEFAULT_PRICE_AXIS_TICK_COUNT
}
