//! Plate-level summaries of the per-position phase sequences.

use serde::{Deserialize, Serialize};

use crate::phases::CurvePhase;
use crate::phenotypes::{CurvePhasePhenotype, PhaseSegment};
use crate::plate::Plate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetaPhenotype {
    MajorImpulseYieldContribution,
    FirstMinorImpulseYieldContribution,
    MajorImpulseAveragePopulationDoublingTime,
    FirstMinorImpulseAveragePopulationDoublingTime,
    InitialAccelerationAsymptoteAngle,
    FinalRetardationAsymptoteAngle,
    InitialAccelerationAsymptoteIntersect,
    FinalRetardationAsymptoteIntersect,
    InitialLag,
    InitialLagAlternativeModel,
    ExperimentDoublings,
    Modalities,
    ModalitiesAlternativeModel,
    Collapses,
    ResidualGrowth,
}

impl MetaPhenotype {
    pub const ALL: [MetaPhenotype; 15] = [
        MetaPhenotype::MajorImpulseYieldContribution,
        MetaPhenotype::FirstMinorImpulseYieldContribution,
        MetaPhenotype::MajorImpulseAveragePopulationDoublingTime,
        MetaPhenotype::FirstMinorImpulseAveragePopulationDoublingTime,
        MetaPhenotype::InitialAccelerationAsymptoteAngle,
        MetaPhenotype::FinalRetardationAsymptoteAngle,
        MetaPhenotype::InitialAccelerationAsymptoteIntersect,
        MetaPhenotype::FinalRetardationAsymptoteIntersect,
        MetaPhenotype::InitialLag,
        MetaPhenotype::InitialLagAlternativeModel,
        MetaPhenotype::ExperimentDoublings,
        MetaPhenotype::Modalities,
        MetaPhenotype::ModalitiesAlternativeModel,
        MetaPhenotype::Collapses,
        MetaPhenotype::ResidualGrowth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetaPhenotype::MajorImpulseYieldContribution => "MajorImpulseYieldContribution",
            MetaPhenotype::FirstMinorImpulseYieldContribution => {
                "FirstMinorImpulseYieldContribution"
            }
            MetaPhenotype::MajorImpulseAveragePopulationDoublingTime => {
                "MajorImpulseAveragePopulationDoublingTime"
            }
            MetaPhenotype::FirstMinorImpulseAveragePopulationDoublingTime => {
                "FirstMinorImpulseAveragePopulationDoublingTime"
            }
            MetaPhenotype::InitialAccelerationAsymptoteAngle => {
                "InitialAccelerationAsymptoteAngle"
            }
            MetaPhenotype::FinalRetardationAsymptoteAngle => "FinalRetardationAsymptoteAngle",
            MetaPhenotype::InitialAccelerationAsymptoteIntersect => {
                "InitialAccelerationAsymptoteIntersect"
            }
            MetaPhenotype::FinalRetardationAsymptoteIntersect => {
                "FinalRetardationAsymptoteIntersect"
            }
            MetaPhenotype::InitialLag => "InitialLag",
            MetaPhenotype::InitialLagAlternativeModel => "InitialLagAlternativeModel",
            MetaPhenotype::ExperimentDoublings => "ExperimentDoublings",
            MetaPhenotype::Modalities => "Modalities",
            MetaPhenotype::ModalitiesAlternativeModel => "ModalitiesAlternativeModel",
            MetaPhenotype::Collapses => "Collapses",
            MetaPhenotype::ResidualGrowth => "ResidualGrowth",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Per-position growth values that are not part of the phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub experiment_doublings: f64,
    pub low_point: f64,
    pub low_point_time: f64,
}

impl Default for GrowthSummary {
    fn default() -> Self {
        Self {
            experiment_doublings: f64::NAN,
            low_point: f64::NAN,
            low_point_time: f64::NAN,
        }
    }
}

/// Computes one meta-phenotype for every position of a plate.
///
/// Undefined values are NaN. `growth` is only consulted by the kinds that need
/// experiment-level values; without it those kinds are NaN everywhere.
pub fn filter_plate(
    plate: &Plate<Vec<PhaseSegment>>,
    kind: MetaPhenotype,
    growth: Option<&Plate<GrowthSummary>>,
) -> Plate<f64> {
    let default_growth = GrowthSummary::default();
    Plate::from_fn(plate.rows(), plate.cols(), |row, col| {
        let Some(sequence) = plate.get(row, col) else {
            return f64::NAN;
        };
        let summary = growth
            .and_then(|g| g.get(row, col))
            .unwrap_or(&default_growth);
        position_value(sequence, kind, summary)
    })
}

/// One meta-phenotype of a single position.
pub fn position_value(sequence: &[PhaseSegment], kind: MetaPhenotype, growth: &GrowthSummary) -> f64 {
    use CurvePhasePhenotype as P;
    let value = match kind {
        MetaPhenotype::MajorImpulseYieldContribution => {
            ranked_impulse(sequence, 1).map_or(f64::NAN, |s| s.value(P::FractionYield))
        }
        MetaPhenotype::FirstMinorImpulseYieldContribution => {
            ranked_impulse(sequence, 2).map_or(f64::NAN, |s| s.value(P::FractionYield))
        }
        MetaPhenotype::MajorImpulseAveragePopulationDoublingTime => {
            ranked_impulse(sequence, 1).map_or(f64::NAN, |s| s.value(P::PopulationDoublingTime))
        }
        MetaPhenotype::FirstMinorImpulseAveragePopulationDoublingTime => {
            ranked_impulse(sequence, 2).map_or(f64::NAN, |s| s.value(P::PopulationDoublingTime))
        }
        MetaPhenotype::InitialAccelerationAsymptoteAngle => custom_value(
            sequence,
            CurvePhase::GrowthAcceleration,
            P::AsymptoteAngle,
            |s| !s.is_empty(),
            |_| 0,
        ),
        MetaPhenotype::FinalRetardationAsymptoteAngle => custom_value(
            sequence,
            CurvePhase::GrowthRetardation,
            P::AsymptoteAngle,
            |s| !s.is_empty(),
            |s| s.len() - 1,
        ),
        MetaPhenotype::InitialAccelerationAsymptoteIntersect => custom_value(
            sequence,
            CurvePhase::GrowthAcceleration,
            P::AsymptoteIntersection,
            |s| !s.is_empty(),
            |_| 0,
        ),
        MetaPhenotype::FinalRetardationAsymptoteIntersect => custom_value(
            sequence,
            CurvePhase::GrowthRetardation,
            P::AsymptoteIntersection,
            |s| !s.is_empty(),
            |s| s.len() - 1,
        ),
        MetaPhenotype::InitialLag => initial_lag(sequence),
        MetaPhenotype::InitialLagAlternativeModel => initial_lag_alternative(sequence, growth),
        MetaPhenotype::ExperimentDoublings => growth.experiment_doublings,
        MetaPhenotype::Modalities => count_phase(sequence, CurvePhase::Impulse),
        MetaPhenotype::ModalitiesAlternativeModel => inner_impulse_count(sequence),
        MetaPhenotype::Collapses => count_phase(sequence, CurvePhase::Collapse),
        MetaPhenotype::ResidualGrowth => residual_growth(sequence),
    };
    if value.is_finite() { value } else { f64::NAN }
}

/// Generic selection: the `measure` of the `phase` segment picked by `selector`,
/// provided the segments of that phase satisfy `requirement`.
pub fn filter_plate_custom(
    plate: &Plate<Vec<PhaseSegment>>,
    phase: CurvePhase,
    measure: CurvePhasePhenotype,
    requirement: impl Fn(&[&PhaseSegment]) -> bool,
    selector: impl Fn(&[&PhaseSegment]) -> usize,
) -> Plate<f64> {
    plate.map(|sequence| custom_value(sequence, phase, measure, &requirement, &selector))
}

fn custom_value(
    sequence: &[PhaseSegment],
    phase: CurvePhase,
    measure: CurvePhasePhenotype,
    requirement: impl Fn(&[&PhaseSegment]) -> bool,
    selector: impl Fn(&[&PhaseSegment]) -> usize,
) -> f64 {
    let matching: Vec<&PhaseSegment> = sequence.iter().filter(|s| s.phase == phase).collect();
    if !requirement(&matching) {
        return f64::NAN;
    }
    matching
        .get(selector(&matching))
        .map_or(f64::NAN, |s| s.value(measure))
}

/// Index of the segment completing the first in-order occurrence of `phases`
/// as a subsequence of the sequence's labels.
pub fn phase_id(sequence: &[PhaseSegment], phases: &[CurvePhase]) -> Option<usize> {
    let mut matched = 0;
    for (idx, segment) in sequence.iter().enumerate() {
        if matched < phases.len() && segment.phase == phases[matched] {
            matched += 1;
            if matched == phases.len() {
                return Some(idx);
            }
        }
    }
    None
}

/// The `measure` of the segment at each position's `ids` entry.
pub fn filter_plate_on_phase_id(
    plate: &Plate<Vec<PhaseSegment>>,
    ids: &Plate<Option<usize>>,
    measure: CurvePhasePhenotype,
) -> anyhow::Result<Plate<f64>> {
    plate.zip_map(ids, |sequence, id| {
        id.and_then(|i| sequence.get(i))
            .map_or(f64::NAN, |s| s.value(measure))
    })
}

fn yield_rank_key(segment: &PhaseSegment) -> f64 {
    let value = segment.value(CurvePhasePhenotype::FractionYield);
    if value.is_nan() { f64::NEG_INFINITY } else { value }
}

/// The `rank`-th largest impulse by `FractionYield` (1 = major).
fn ranked_impulse(sequence: &[PhaseSegment], rank: usize) -> Option<&PhaseSegment> {
    let mut impulses: Vec<&PhaseSegment> = sequence
        .iter()
        .filter(|s| s.phase == CurvePhase::Impulse)
        .collect();
    if rank == 0 || impulses.len() < rank {
        return None;
    }
    impulses.sort_by(|a, b| yield_rank_key(a).total_cmp(&yield_rank_key(b)));
    impulses.get(impulses.len() - rank).copied()
}

fn initial_lag(sequence: &[PhaseSegment]) -> f64 {
    use CurvePhasePhenotype as P;
    let Some(flat) = sequence.iter().find(|s| s.phase == CurvePhase::Flat) else {
        return f64::NAN;
    };
    let Some(impulse) =
        phase_id(sequence, &[CurvePhase::Flat, CurvePhase::Impulse]).map(|i| &sequence[i])
    else {
        return f64::NAN;
    };
    let lag = (impulse.value(P::LinearModelIntercept) - flat.value(P::LinearModelIntercept))
        / (flat.value(P::LinearModelSlope) - impulse.value(P::LinearModelSlope));
    if lag < 0.0 { f64::NAN } else { lag }
}

fn initial_lag_alternative(sequence: &[PhaseSegment], growth: &GrowthSummary) -> f64 {
    use CurvePhasePhenotype as P;
    let Some(major) = ranked_impulse(sequence, 1) else {
        return f64::NAN;
    };
    let flat_slope = 0.0;
    let flat_intercept = growth.low_point.log2();
    let lag = (major.value(P::LinearModelIntercept) - flat_intercept)
        / (flat_slope - major.value(P::LinearModelSlope));
    if lag < 0.0 || major.value(P::Start) < growth.low_point_time {
        return f64::NAN;
    }
    lag
}

fn count_phase(sequence: &[PhaseSegment], phase: CurvePhase) -> f64 {
    if sequence.is_empty() {
        return f64::NAN;
    }
    sequence.iter().filter(|s| s.phase == phase).count() as f64
}

fn inner_impulse_count(sequence: &[PhaseSegment]) -> f64 {
    let Some(first_acc) = sequence
        .iter()
        .position(|s| s.phase == CurvePhase::GrowthAcceleration)
    else {
        return f64::NAN;
    };
    let Some(last_ret) = sequence
        .iter()
        .rposition(|s| s.phase == CurvePhase::GrowthRetardation)
    else {
        return f64::NAN;
    };
    if last_ret < first_acc {
        return f64::NAN;
    }
    count_phase(&sequence[first_acc..last_ret], CurvePhase::Impulse)
}

fn residual_growth(sequence: &[PhaseSegment]) -> f64 {
    let Some(last_impulse) = sequence
        .iter()
        .rposition(|s| s.phase == CurvePhase::Impulse)
    else {
        return f64::NAN;
    };
    sequence[last_impulse + 1..]
        .iter()
        .map(|s| s.value(CurvePhasePhenotype::FractionYield))
        .filter(|v| v.is_finite())
        .sum()
}
