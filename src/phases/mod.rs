//! Curve phase segmentation.

mod bridge;
mod derivatives;
mod nonlinear;
mod segment;
mod thresholds;

use serde::{Deserialize, Serialize};

pub use bridge::bridge_gaps;
pub use derivatives::{
    DerivativeSet, GAUSS_STD, GAUSS_TAPS, curve_derivatives, finite_difference,
    prepare_derivatives,
};
pub use nonlinear::{classify_non_linear_window, set_nonlinear_phase_type};
pub use segment::{SegmentInput, SegmentObserver, SegmentStep, segment, segment_with_observer};
pub use thresholds::{ThresholdKey, Thresholds, load_thresholds_tsv, parse_thresholds_tsv};

/// Phases a growth curve sample can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurvePhase {
    /// Conflicting classifications; reserved, never produced by the segmenter.
    Multiple,
    /// Not (yet) fulfilling any classification.
    Undetermined,
    /// No growth or collapse.
    Flat,
    /// Positive first and second derivative.
    GrowthAcceleration,
    /// Positive first derivative, negative second derivative.
    GrowthRetardation,
    /// Close to linear growth.
    Impulse,
    /// Close to linear decline.
    Collapse,
    /// Negative first and second derivative.
    CollapseAcceleration,
    /// Negative first derivative, positive second derivative.
    CollapseRetardation,
    /// Known not to be linear, otherwise unclassified.
    UndeterminedNonLinear,
    /// Known not to be flat, otherwise unclassified.
    UndeterminedNonFlat,
}

impl CurvePhase {
    pub const ALL: [CurvePhase; 11] = [
        CurvePhase::Multiple,
        CurvePhase::Undetermined,
        CurvePhase::Flat,
        CurvePhase::GrowthAcceleration,
        CurvePhase::GrowthRetardation,
        CurvePhase::Impulse,
        CurvePhase::Collapse,
        CurvePhase::CollapseAcceleration,
        CurvePhase::CollapseRetardation,
        CurvePhase::UndeterminedNonLinear,
        CurvePhase::UndeterminedNonFlat,
    ];

    /// Stable numeric code used in tabular output.
    pub fn code(self) -> i8 {
        match self {
            CurvePhase::Multiple => -1,
            CurvePhase::Undetermined => 0,
            CurvePhase::Flat => 1,
            CurvePhase::GrowthAcceleration => 2,
            CurvePhase::GrowthRetardation => 3,
            CurvePhase::Impulse => 4,
            CurvePhase::Collapse => 5,
            CurvePhase::CollapseAcceleration => 6,
            CurvePhase::CollapseRetardation => 7,
            CurvePhase::UndeterminedNonLinear => 8,
            CurvePhase::UndeterminedNonFlat => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CurvePhase::Multiple => "Multiple",
            CurvePhase::Undetermined => "Undetermined",
            CurvePhase::Flat => "Flat",
            CurvePhase::GrowthAcceleration => "GrowthAcceleration",
            CurvePhase::GrowthRetardation => "GrowthRetardation",
            CurvePhase::Impulse => "Impulse",
            CurvePhase::Collapse => "Collapse",
            CurvePhase::CollapseAcceleration => "CollapseAcceleration",
            CurvePhase::CollapseRetardation => "CollapseRetardation",
            CurvePhase::UndeterminedNonLinear => "UndeterminedNonLinear",
            CurvePhase::UndeterminedNonFlat => "UndeterminedNonFlat",
        }
    }

    /// Any of the three undetermined states.
    pub fn is_undetermined(self) -> bool {
        matches!(
            self,
            CurvePhase::Undetermined
                | CurvePhase::UndeterminedNonLinear
                | CurvePhase::UndeterminedNonFlat
        )
    }

    /// Phases summarised by asymptotes rather than a linear model.
    pub fn is_non_linear(self) -> bool {
        matches!(
            self,
            CurvePhase::GrowthAcceleration
                | CurvePhase::GrowthRetardation
                | CurvePhase::CollapseAcceleration
                | CurvePhase::CollapseRetardation
        )
    }

    /// Sign requirements (first, second derivative) a sample must satisfy to
    /// belong to a non-linear phase; `>= 0` when `true`, `<= 0` when `false`.
    pub(crate) fn derivative_sign_rule(self) -> Option<(bool, bool)> {
        match self {
            CurvePhase::GrowthAcceleration => Some((true, true)),
            CurvePhase::GrowthRetardation => Some((true, false)),
            CurvePhase::CollapseAcceleration => Some((false, false)),
            CurvePhase::CollapseRetardation => Some((false, true)),
            _ => None,
        }
    }
}

impl std::fmt::Display for CurvePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge of a candidate region from which a non-linear test window grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEdge {
    Left,
    Right,
    /// Left or right, whichever half holds the steepest slope.
    Intelligent,
}
