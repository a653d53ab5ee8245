use std::path::PathBuf;

use crate::io::plate_input::PlateInput;
use crate::meta::{GrowthSummary, MetaPhenotype};
use crate::phases::{CurvePhase, DerivativeSet, Thresholds};
use crate::phenotypes::PhaseSegment;
use crate::plate::Plate;
use crate::schema::v1::GrowthPhaseV1;

#[derive(Debug, Clone)]
pub struct InputMeta {
    pub plate: Option<String>,
    pub rows: Option<u64>,
    pub cols: Option<u64>,
    pub samples: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub phases_tsv_path: PathBuf,
    pub meta_tsv_path: PathBuf,
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub thresholds_path: Option<PathBuf>,
    pub meta_kinds: Vec<MetaPhenotype>,
    pub write_json: bool,
    pub write_tsv: bool,
    pub threads: usize,
    pub warnings: Vec<String>,
    pub thresholds: Thresholds,
    pub plate_input: Option<PlateInput>,
    pub growth: Option<Plate<GrowthSummary>>,
    /// Per position, row-major.
    pub derivatives: Vec<DerivativeSet>,
    /// Per position, row-major.
    pub phases: Vec<Vec<CurvePhase>>,
    pub sequences: Option<Plate<Vec<PhaseSegment>>>,
    pub meta: Vec<(MetaPhenotype, Plate<f64>)>,
    pub input_meta: InputMeta,
    pub output: OutputPaths,
    pub report: GrowthPhaseV1,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        out_dir: PathBuf,
        thresholds_path: Option<PathBuf>,
        write_json: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("growthphase.json");
        let phases_tsv_path = out_dir.join("phases.tsv");
        let meta_tsv_path = out_dir.join("meta.tsv");
        let thresholds = Thresholds::default();
        let report = GrowthPhaseV1::empty(tool_version, thresholds.clone());
        Self {
            input,
            thresholds_path,
            meta_kinds: MetaPhenotype::ALL.to_vec(),
            write_json,
            write_tsv,
            threads: 0,
            warnings: Vec::new(),
            thresholds,
            plate_input: None,
            growth: None,
            derivatives: Vec::new(),
            phases: Vec::new(),
            sequences: None,
            meta: Vec::new(),
            input_meta: InputMeta {
                plate: None,
                rows: None,
                cols: None,
                samples: None,
            },
            output: OutputPaths {
                out_dir,
                json_path,
                phases_tsv_path,
                meta_tsv_path,
            },
            report,
        }
    }

    pub fn plate_input(&self) -> anyhow::Result<&PlateInput> {
        use anyhow::Context;
        self.plate_input.as_ref().context("plate input not loaded")
    }
}
