pub mod candlestick;
pub mod normalize;
pub mod price_scale;
pub mod primitives;
pub mod scale;
pub mod tick_labels;
pub mod time_scale;
pub mod types;
pub mod wire;

pub use candlestick::{
    CANDLE_GUTTER_PX, CandleGeometry, MIN_RENDERED_BODY_HEIGHT_PX, OhlcBar, Sentiment,
    body_width_for, candle_center_x, compile_candles,
};
pub use normalize::{RawBar, canonicalize_bars, normalize_bars};
pub use price_scale::{PRICE_DOMAIN_PADDING, PriceScale, PriceTick};
pub use scale::LinearScale;
pub use tick_labels::{
    Granularity, TickLabel, TickLabelPolicy, is_tick_label_visible, tick_label_modulus,
};
pub use time_scale::{BandScale, ContinuousTimeScale, HorizontalScale, HorizontalScaleMode};
pub use types::{Margins, PlotArea, Viewport};
pub use wire::{AggregatesPayload, AggregatesQuery};
