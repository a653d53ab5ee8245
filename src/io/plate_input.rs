use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::io::open_maybe_gz;
use crate::meta::GrowthSummary;
use crate::plate::Plate;

/// One plate of smoothed growth curves sharing a time axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateInput {
    #[serde(default)]
    pub plate: Option<String>,
    pub times: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
    /// Row-major.
    pub positions: Vec<PositionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInput {
    /// Population size per time point (linear scale).
    pub curve: Vec<f64>,
    #[serde(default)]
    pub derivative: Option<Vec<f64>>,
    #[serde(default)]
    pub end_average: Option<f64>,
    #[serde(default)]
    pub baseline: Option<f64>,
    #[serde(default)]
    pub low_point: Option<f64>,
    #[serde(default)]
    pub low_point_time: Option<f64>,
}

pub fn read_plate_input(path: &Path) -> Result<PlateInput> {
    let reader = BufReader::new(open_maybe_gz(path)?);
    let input: PlateInput = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse plate JSON {}", path.display()))?;
    Ok(input)
}

/// Shape checks; returns warnings for data that is usable but suspicious.
pub fn validate_plate(input: &PlateInput) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    if input.rows.checked_mul(input.cols) != Some(input.positions.len()) {
        bail!(
            "plate shape {}x{} does not match {} positions",
            input.rows,
            input.cols,
            input.positions.len()
        );
    }
    if input.times.iter().any(|t| !t.is_finite()) {
        bail!("times contain non-finite values");
    }
    if input.times.windows(2).any(|w| w[1] <= w[0]) {
        bail!("times must be strictly increasing");
    }

    let n = input.times.len();
    for (idx, position) in input.positions.iter().enumerate() {
        let (row, col) = (idx / input.cols.max(1), idx % input.cols.max(1));
        if position.curve.len() != n {
            bail!(
                "position ({}, {}): curve has {} samples, times has {}",
                row,
                col,
                position.curve.len(),
                n
            );
        }
        if let Some(derivative) = &position.derivative {
            if derivative.len() > n {
                bail!(
                    "position ({}, {}): derivative longer than curve ({} > {})",
                    row,
                    col,
                    derivative.len(),
                    n
                );
            }
        }
        let unusable = position
            .curve
            .iter()
            .filter(|v| !(v.is_finite() && **v > 0.0))
            .count();
        if unusable > 0 {
            warnings.push(format!(
                "position ({}, {}): {} non-positive or non-finite samples",
                row, col, unusable
            ));
        }
    }
    Ok(warnings)
}

/// Experiment-level values per position, with fallbacks taken from the curve.
pub fn growth_summaries(input: &PlateInput) -> Result<(Plate<GrowthSummary>, Vec<String>)> {
    let mut warnings = Vec::new();
    let mut cells = Vec::with_capacity(input.positions.len());
    for (idx, position) in input.positions.iter().enumerate() {
        let (row, col) = (idx / input.cols.max(1), idx % input.cols.max(1));
        let usable = |v: &&f64| v.is_finite() && **v > 0.0;

        let end = match position.end_average {
            Some(v) => Some(v),
            None => {
                let fallback = position.curve.iter().rev().find(usable).copied();
                if fallback.is_some() {
                    warnings.push(format!(
                        "position ({}, {}): end_average missing, using last sample",
                        row, col
                    ));
                }
                fallback
            }
        };
        let baseline = match position.baseline {
            Some(v) => Some(v),
            None => {
                let fallback = position.curve.iter().find(usable).copied();
                if fallback.is_some() {
                    warnings.push(format!(
                        "position ({}, {}): baseline missing, using first sample",
                        row, col
                    ));
                }
                fallback
            }
        };
        let experiment_doublings = match (end, baseline) {
            (Some(end), Some(baseline)) => end.log2() - baseline.log2(),
            _ => f64::NAN,
        };

        let lowest = position
            .curve
            .iter()
            .enumerate()
            .filter(|(_, v)| usable(v))
            .min_by(|a, b| a.1.total_cmp(b.1));
        let low_point = position
            .low_point
            .or_else(|| lowest.map(|(_, &v)| v))
            .unwrap_or(f64::NAN);
        let low_point_time = position
            .low_point_time
            .or_else(|| lowest.and_then(|(i, _)| input.times.get(i).copied()))
            .unwrap_or(f64::NAN);

        cells.push(GrowthSummary {
            experiment_doublings,
            low_point,
            low_point_time,
        });
    }
    let plate = Plate::new(input.rows, input.cols, cells)?;
    Ok((plate, warnings))
}
