//! candle-chart-rs: candlestick chart layout and interaction engine.
//!
//! The crate turns already-fetched OHLC bars plus a measured viewport into
//! renderable geometry (candles, axis labels) and resolves pointer positions
//! to the nearest bar for crosshair/tooltip display. Computing a layout is
//! pure; painting it is delegated to a [`render::Renderer`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
