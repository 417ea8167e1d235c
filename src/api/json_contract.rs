use serde::{Deserialize, Serialize};

use crate::core::{CandleGeometry, OhlcBar, TickLabel, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CrosshairPhase, Tooltip};

use super::ChartEngineConfig;

pub const ENGINE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable view of the engine's committed state, for diagnostics and fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub config: ChartEngineConfig,
    pub viewport: Option<Viewport>,
    pub layout_generation: u64,
    pub bars: Vec<OhlcBar>,
    pub box_width: Option<f64>,
    pub candles: Vec<CandleGeometry>,
    pub tick_labels: Vec<TickLabel>,
    pub crosshair_phase: CrosshairPhase,
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: EngineSnapshot,
}

impl EngineSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = EngineSnapshotJsonContractV1 {
            schema_version: ENGINE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload)
            .map_err(ChartError::json("failed to serialize snapshot contract v1"))
    }

    /// Accepts either a bare snapshot or a versioned v1 envelope.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<EngineSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: EngineSnapshotJsonContractV1 = serde_json::from_str(input)
            .map_err(ChartError::json("failed to parse snapshot json payload"))?;
        if payload.schema_version != ENGINE_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
