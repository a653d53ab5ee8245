use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::phases::{CurvePhase, Thresholds};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMeta {
    pub plate: Option<String>,
    pub rows: Option<u64>,
    pub cols: Option<u64>,
    pub samples: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    pub phase: CurvePhase,
    pub left: u64,
    pub right: u64,
    /// Phenotype name to value; undefined values are `null`.
    pub phenotypes: Option<BTreeMap<String, Option<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub row: u64,
    pub col: u64,
    pub total_doublings: Option<f64>,
    pub phases: Vec<CurvePhase>,
    pub segments: Vec<SegmentReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPlateReport {
    pub kind: String,
    /// Row-major values; undefined positions are `null`.
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthPhaseV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub thresholds: Thresholds,
    pub positions: Vec<PositionReport>,
    pub meta: Vec<MetaPlateReport>,
    pub warnings: Vec<String>,
}

impl GrowthPhaseV1 {
    pub fn empty(tool_version: &str, thresholds: Thresholds) -> Self {
        Self {
            tool: "kira-growthphase".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta {
                plate: None,
                rows: None,
                cols: None,
                samples: None,
            },
            thresholds,
            positions: Vec::new(),
            meta: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// `None` for values the report shows as `null`.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
