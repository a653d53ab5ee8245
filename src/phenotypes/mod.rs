//! Scalar phenotypes of the phase segments of one curve.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::math::runs::runs_where;
use crate::math::stats::linregress;
use crate::phases::{CurvePhase, SegmentInput, Thresholds, curve_derivatives, segment};

const PARALLEL_ASYMPTOTE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurvePhasePhenotype {
    /// Inverse slope of the log2 linear model.
    PopulationDoublingTime,
    Duration,
    /// Share of the experiment's population doublings made during the segment.
    FractionYield,
    Start,
    LinearModelSlope,
    LinearModelIntercept,
    /// Angle between the asymptotes at the segment's two edges.
    AsymptoteAngle,
    /// Where the edge asymptotes cross, as a fraction of `Duration` from `Start`.
    AsymptoteIntersection,
}

impl CurvePhasePhenotype {
    pub fn name(self) -> &'static str {
        match self {
            CurvePhasePhenotype::PopulationDoublingTime => "PopulationDoublingTime",
            CurvePhasePhenotype::Duration => "Duration",
            CurvePhasePhenotype::FractionYield => "FractionYield",
            CurvePhasePhenotype::Start => "Start",
            CurvePhasePhenotype::LinearModelSlope => "LinearModelSlope",
            CurvePhasePhenotype::LinearModelIntercept => "LinearModelIntercept",
            CurvePhasePhenotype::AsymptoteAngle => "AsymptoteAngle",
            CurvePhasePhenotype::AsymptoteIntersection => "AsymptoteIntersection",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhenotypeRecord {
    values: BTreeMap<CurvePhasePhenotype, f64>,
}

impl PhenotypeRecord {
    pub fn insert(&mut self, kind: CurvePhasePhenotype, value: f64) {
        self.values.insert(kind, value);
    }

    pub fn get(&self, kind: CurvePhasePhenotype) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurvePhasePhenotype, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}

/// One maximal run of a phase label, `[left, right)` in curve indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSegment {
    pub phase: CurvePhase,
    pub left: usize,
    pub right: usize,
    /// `None` for `Undetermined` and `Multiple` runs.
    pub phenotypes: Option<PhenotypeRecord>,
}

impl PhaseSegment {
    /// The phenotype value, NaN when the segment has no record or lacks the kind.
    pub fn value(&self, kind: CurvePhasePhenotype) -> f64 {
        self.phenotypes
            .as_ref()
            .and_then(|r| r.get(kind))
            .unwrap_or(f64::NAN)
    }

    fn start(&self) -> f64 {
        match &self.phenotypes {
            Some(_) => self.value(CurvePhasePhenotype::Start),
            None => f64::INFINITY,
        }
    }
}

/// Segments of one curve ordered by start time.
pub type PhaseSequence = Vec<PhaseSegment>;

/// Label array and phenotype sequence of one analysed curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveAnalysis {
    pub phases: Vec<CurvePhase>,
    pub segments: PhaseSequence,
}

/// Computes the phenotypes of every maximal run in `phases`.
///
/// `derivative` is the smoothed first derivative used for segmentation; when it
/// is shorter than the curve it is assumed centred on it. Runs are sorted by
/// `Start`, runs without a record last.
pub fn phenotype_phases(
    curve: &[f64],
    derivative: &[f64],
    phases: &[CurvePhase],
    times: &[f64],
    total_doublings: f64,
) -> PhaseSequence {
    let derivative_offset = times.len().saturating_sub(derivative.len()) / 2;
    let mut segments = Vec::new();

    for phase in CurvePhase::ALL {
        for run in runs_where(phases, |&p| p == phase) {
            let phenotypes = match phase {
                CurvePhase::Undetermined | CurvePhase::Multiple => None,
                CurvePhase::GrowthAcceleration
                | CurvePhase::GrowthRetardation
                | CurvePhase::CollapseAcceleration
                | CurvePhase::CollapseRetardation => {
                    let mut record = PhenotypeRecord::default();
                    let k1 = derivative_at(derivative, run.left, derivative_offset);
                    let k2 = derivative_at(derivative, run.right - 1, derivative_offset);
                    let (angle, intersection) = asymptote_phenotypes(
                        (times[run.left], curve[run.left].log2(), k1),
                        (times[run.right - 1], curve[run.right - 1].log2(), k2),
                    );
                    record.insert(CurvePhasePhenotype::AsymptoteIntersection, intersection);
                    record.insert(CurvePhasePhenotype::AsymptoteAngle, angle);
                    Some(record)
                }
                CurvePhase::Flat
                | CurvePhase::Impulse
                | CurvePhase::Collapse
                | CurvePhase::UndeterminedNonLinear
                | CurvePhase::UndeterminedNonFlat => {
                    let mut record = PhenotypeRecord::default();
                    let log_curve: Vec<f64> =
                        curve[run.left..run.right].iter().map(|v| v.log2()).collect();
                    let fit = linregress(&times[run.left..run.right], &log_curve);
                    record.insert(
                        CurvePhasePhenotype::PopulationDoublingTime,
                        doubling_time(fit.slope),
                    );
                    record.insert(CurvePhasePhenotype::LinearModelSlope, fit.slope);
                    record.insert(CurvePhasePhenotype::LinearModelIntercept, fit.intercept);
                    Some(record)
                }
            };

            let phenotypes = phenotypes.map(|mut record| {
                let time_left = times[run.left];
                let time_right = times[run.right - 1];
                record.insert(CurvePhasePhenotype::Duration, time_right - time_left);
                record.insert(
                    CurvePhasePhenotype::FractionYield,
                    fraction_yield(curve[run.left], curve[run.right - 1], total_doublings),
                );
                record.insert(CurvePhasePhenotype::Start, time_left);
                record
            });

            segments.push(PhaseSegment {
                phase,
                left: run.left,
                right: run.right,
                phenotypes,
            });
        }
    }

    segments.sort_by(|a, b| a.start().total_cmp(&b.start()));
    segments
}

fn derivative_at(derivative: &[f64], idx: usize, offset: usize) -> f64 {
    if derivative.is_empty() {
        return f64::NAN;
    }
    let i = idx.saturating_sub(offset).min(derivative.len() - 1);
    derivative[i]
}

fn doubling_time(slope: f64) -> f64 {
    if slope.is_finite() && slope != 0.0 {
        1.0 / slope
    } else {
        f64::NAN
    }
}

fn fraction_yield(size_left: f64, size_right: f64, total_doublings: f64) -> f64 {
    if !total_doublings.is_finite() || total_doublings == 0.0 {
        return f64::NAN;
    }
    let value = (size_right.log2() - size_left.log2()) / total_doublings;
    if value.is_finite() { value } else { f64::NAN }
}

/// Angle and relative intersection of the tangents at a segment's two edges.
///
/// Each edge is `(time, log2 size, slope)`. The intersection is NaN when the
/// tangents are (nearly) parallel or the segment has no duration.
pub fn asymptote_phenotypes(left: (f64, f64, f64), right: (f64, f64, f64)) -> (f64, f64) {
    let (t1, y1, k1) = left;
    let (t2, y2, k2) = right;

    let angle = if k1.is_finite() && k2.is_finite() {
        PI + k1.atan2(1.0) - k2.atan2(1.0)
    } else {
        f64::NAN
    };

    let duration = t2 - t1;
    let intersection = if (k1 - k2).abs() >= PARALLEL_ASYMPTOTE_EPS && duration > 0.0 {
        let m1 = y1 - k1 * t1;
        let m2 = y2 - k2 * t2;
        let i_x = (m2 - m1) / (k1 - k2);
        let value = (i_x - t1) / duration;
        if value.is_finite() { value } else { f64::NAN }
    } else {
        f64::NAN
    };

    (angle, intersection)
}

/// Segments one curve and phenotypes the result.
///
/// Without a `raw_derivative`, the derivative is taken from `log2(curve)` by
/// finite differences (see [`curve_derivatives`]).
pub fn phase_phenotypes(
    times: &[f64],
    curve: &[f64],
    raw_derivative: Option<&[f64]>,
    total_doublings: f64,
    thresholds: &Thresholds,
) -> Result<CurveAnalysis> {
    let derivatives = curve_derivatives(times, curve, raw_derivative, thresholds);
    let input = SegmentInput::new(times, curve, &derivatives);
    let phases = segment(&input, thresholds)?;
    let segments = phenotype_phases(curve, &derivatives.dydt, &phases, times, total_doublings);
    Ok(CurveAnalysis { phases, segments })
}
