use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKey {
    LinearModelExtension,
    PhaseMinimumLength,
    FlatlineSlopeRequirement,
    UniformityThreshold,
    UniformityTestMinSize,
    SecondDerivativeSigmaAsNotZero,
    NonFlatLinearMinimumLength,
    BridgingMaxWindow,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 8] = [
        ThresholdKey::LinearModelExtension,
        ThresholdKey::PhaseMinimumLength,
        ThresholdKey::FlatlineSlopeRequirement,
        ThresholdKey::UniformityThreshold,
        ThresholdKey::UniformityTestMinSize,
        ThresholdKey::SecondDerivativeSigmaAsNotZero,
        ThresholdKey::NonFlatLinearMinimumLength,
        ThresholdKey::BridgingMaxWindow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ThresholdKey::LinearModelExtension => "LinearModelExtension",
            ThresholdKey::PhaseMinimumLength => "PhaseMinimumLength",
            ThresholdKey::FlatlineSlopeRequirement => "FlatlineSlopeRequirement",
            ThresholdKey::UniformityThreshold => "UniformityThreshold",
            ThresholdKey::UniformityTestMinSize => "UniformityTestMinSize",
            ThresholdKey::SecondDerivativeSigmaAsNotZero => "SecondDerivativeSigmaAsNotZero",
            ThresholdKey::NonFlatLinearMinimumLength => "NonFlatLinearMinimumLength",
            ThresholdKey::BridgingMaxWindow => "BridgingMaxWindow",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn is_count(self) -> bool {
        matches!(
            self,
            ThresholdKey::PhaseMinimumLength
                | ThresholdKey::UniformityTestMinSize
                | ThresholdKey::NonFlatLinearMinimumLength
                | ThresholdKey::BridgingMaxWindow
        )
    }
}

/// Read-only configuration of the segmentation algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Tolerance band around the tangent at the steepest point, as a fraction
    /// of the log2 population size there.
    pub linear_model_extension: f64,
    /// Minimum run length of an accepted flat or non-linear phase.
    pub phase_minimum_length: usize,
    /// First derivative magnitude below which the slope counts as flat.
    pub flatline_slope_requirement: f64,
    /// Fraction of derivative signs that must agree in a non-linear test window.
    pub uniformity_threshold: f64,
    /// Initial width of the non-linear test window.
    pub uniformity_test_min_size: usize,
    /// Second derivative dead zone, in standard deviations.
    pub second_derivative_sigma_as_not_zero: f64,
    /// Minimum run length of an accepted impulse or collapse.
    pub non_flat_linear_minimum_length: usize,
    /// Largest median window used when closing gaps in candidate masks.
    pub bridging_max_window: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            linear_model_extension: 0.01,
            phase_minimum_length: 3,
            flatline_slope_requirement: 0.02,
            uniformity_threshold: 0.4,
            uniformity_test_min_size: 7,
            second_derivative_sigma_as_not_zero: 0.5,
            non_flat_linear_minimum_length: 7,
            bridging_max_window: 5,
        }
    }
}

impl Thresholds {
    pub fn get(&self, key: ThresholdKey) -> f64 {
        match key {
            ThresholdKey::LinearModelExtension => self.linear_model_extension,
            ThresholdKey::PhaseMinimumLength => self.phase_minimum_length as f64,
            ThresholdKey::FlatlineSlopeRequirement => self.flatline_slope_requirement,
            ThresholdKey::UniformityThreshold => self.uniformity_threshold,
            ThresholdKey::UniformityTestMinSize => self.uniformity_test_min_size as f64,
            ThresholdKey::SecondDerivativeSigmaAsNotZero => {
                self.second_derivative_sigma_as_not_zero
            }
            ThresholdKey::NonFlatLinearMinimumLength => self.non_flat_linear_minimum_length as f64,
            ThresholdKey::BridgingMaxWindow => self.bridging_max_window as f64,
        }
    }

    pub fn set(&mut self, key: ThresholdKey, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            bail!("threshold {} must be finite and >= 0, got {}", key.name(), value);
        }
        if key.is_count() && value.fract() != 0.0 {
            bail!("threshold {} must be an integer, got {}", key.name(), value);
        }
        let count = value as usize;
        match key {
            ThresholdKey::LinearModelExtension => self.linear_model_extension = value,
            ThresholdKey::PhaseMinimumLength => self.phase_minimum_length = count,
            ThresholdKey::FlatlineSlopeRequirement => self.flatline_slope_requirement = value,
            ThresholdKey::UniformityThreshold => self.uniformity_threshold = value,
            ThresholdKey::UniformityTestMinSize => {
                if count == 0 {
                    bail!("threshold {} must be >= 1", key.name());
                }
                self.uniformity_test_min_size = count
            }
            ThresholdKey::SecondDerivativeSigmaAsNotZero => {
                self.second_derivative_sigma_as_not_zero = value
            }
            ThresholdKey::NonFlatLinearMinimumLength => self.non_flat_linear_minimum_length = count,
            ThresholdKey::BridgingMaxWindow => self.bridging_max_window = count,
        }
        Ok(())
    }

    /// Defaults overlaid with the `key<TAB>value` pairs of an optional file.
    pub fn with_overlay(path: Option<&Path>) -> Result<Self> {
        let mut thresholds = Self::default();
        if let Some(path) = path {
            for (key, value) in load_thresholds_tsv(path)? {
                thresholds.set(key, value)?;
            }
        }
        Ok(thresholds)
    }
}

pub fn load_thresholds_tsv(path: &Path) -> Result<Vec<(ThresholdKey, f64)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thresholds TSV {}", path.display()))?;
    parse_thresholds_tsv(&content, &path.display().to_string())
}

pub fn parse_thresholds_tsv(content: &str, source: &str) -> Result<Vec<(ThresholdKey, f64)>> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() != 2 {
            bail!("{}:{} malformed TSV (expected 2 columns)", source, line_no);
        }
        let key = ThresholdKey::parse(parts[0].trim()).ok_or_else(|| {
            anyhow::anyhow!("{}:{} unknown threshold '{}'", source, line_no, parts[0].trim())
        })?;
        let value: f64 = parts[1]
            .trim()
            .parse()
            .with_context(|| format!("{}:{} invalid value '{}'", source, line_no, parts[1]))?;
        out.push((key, value));
    }
    Ok(out)
}
