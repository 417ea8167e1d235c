mod engine;
mod engine_config;
mod json_contract;
mod layout;
mod render_frame_builder;
mod resize_adapter;

pub use engine::ChartEngine;
pub use engine_config::{ChartEngineConfig, DEFAULT_PRICE_AXIS_TICK_COUNT};
pub use json_contract::{
    ENGINE_SNAPSHOT_JSON_SCHEMA_V1, EngineSnapshot, EngineSnapshotJsonContractV1,
};
pub use layout::{ChartLayout, LayoutOptions};
pub use render_frame_builder::build_render_frame;
pub use resize_adapter::ViewportResizeAdapter;
