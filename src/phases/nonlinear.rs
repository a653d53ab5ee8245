use anyhow::Result;
use tracing::debug;

use crate::math::runs::{consensus_filter, locate_single_run, runs};
use crate::phases::{CurvePhase, PhaseEdge, Thresholds};

const CONSENSUS_WINDOW: usize = 9;
const TEST_WINDOW_STEP: usize = 4;

/// Determines and writes the non-linear phase of the candidate region `filt`.
///
/// A window grows from `test_edge` (starting at `UniformityTestMinSize`, step 4)
/// until the derivative signs in it agree on a phase type. The samples of the
/// region matching that type are smoothed by a 9-wide consensus filter and the
/// run adjacent to the tested edge is labelled, provided it is at least
/// `PhaseMinimumLength` long.
///
/// `filt` must describe a single contiguous run. Returns
/// [`CurvePhase::Undetermined`] when nothing qualified; `phases` is then untouched.
pub fn set_nonlinear_phase_type(
    dydt: &[f64],
    dydt_signs: &[i8],
    ddydt_signs: &[i8],
    filt: &[bool],
    test_edge: PhaseEdge,
    thresholds: &Thresholds,
    phases: &mut [CurvePhase],
) -> Result<CurvePhase> {
    let Some(region) = locate_single_run(filt)? else {
        return Ok(CurvePhase::Undetermined);
    };

    let edge = match test_edge {
        PhaseEdge::Intelligent => {
            let mut steepest: Option<(usize, f64)> = None;
            for (pos, i) in region.indices().enumerate() {
                let d = dydt[i].abs();
                if d.is_finite() && steepest.is_none_or(|(_, best)| d > best) {
                    steepest = Some((pos, d));
                }
            }
            let pos = steepest.map(|(pos, _)| pos).unwrap_or(0);
            if (pos as f64) / (region.len() as f64) < 0.5 {
                PhaseEdge::Left
            } else {
                PhaseEdge::Right
            }
        }
        edge => edge,
    };

    let d_region = &dydt_signs[region.left..region.right];
    let dd_region = &ddydt_signs[region.left..region.right];
    let mut phase = CurvePhase::Undetermined;
    let mut test_length = thresholds.uniformity_test_min_size;
    while test_length < dydt.len() {
        let len = test_length.min(region.len());
        let (d_window, dd_window) = match edge {
            PhaseEdge::Right => (
                &d_region[region.len() - len..],
                &dd_region[region.len() - len..],
            ),
            _ => (&d_region[..len], &dd_region[..len]),
        };
        phase = classify_non_linear_window(d_window, dd_window, thresholds.uniformity_threshold);
        if phase != CurvePhase::Undetermined || len == region.len() {
            break;
        }
        test_length += TEST_WINDOW_STEP;
    }

    let Some((slope_positive, curvature_positive)) = phase.derivative_sign_rule() else {
        return Ok(CurvePhase::Undetermined);
    };

    let candidates: Vec<bool> = (0..filt.len())
        .map(|i| {
            filt[i]
                && sign_matches(dydt_signs[i], slope_positive)
                && sign_matches(ddydt_signs[i], curvature_positive)
        })
        .collect();
    let candidates: Vec<bool> = consensus_filter(&candidates, CONSENSUS_WINDOW)
        .into_iter()
        .zip(filt)
        .map(|(c, &f)| c && f)
        .collect();

    let found = runs(&candidates);
    let chosen = match edge {
        PhaseEdge::Right => found.last(),
        _ => found.first(),
    };
    let Some(chosen) = chosen else {
        return Ok(CurvePhase::Undetermined);
    };
    if chosen.len() < thresholds.phase_minimum_length {
        return Ok(CurvePhase::Undetermined);
    }

    phases[chosen.left..chosen.right].fill(phase);
    debug!(
        phase = %phase,
        left = chosen.left,
        right = chosen.right,
        "non-linear segment accepted"
    );
    Ok(phase)
}

fn sign_matches(sign: i8, positive: bool) -> bool {
    if positive { sign >= 0 } else { sign <= 0 }
}

/// Phase type implied by a window of first and second derivative signs.
///
/// The mean sign of each derivative gives its direction; the fraction of
/// samples agreeing with (or zero against) that direction must exceed
/// `uniformity_threshold` for both derivatives.
pub fn classify_non_linear_window(
    dydt_signs: &[i8],
    ddydt_signs: &[i8],
    uniformity_threshold: f64,
) -> CurvePhase {
    if ddydt_signs.is_empty() || dydt_signs.is_empty() {
        return CurvePhase::Undetermined;
    }
    let Some(curvature) = agreement(ddydt_signs) else {
        return CurvePhase::Undetermined;
    };
    let (rising, falling) = if curvature > uniformity_threshold {
        (CurvePhase::GrowthAcceleration, CurvePhase::CollapseRetardation)
    } else if curvature < -uniformity_threshold {
        (CurvePhase::GrowthRetardation, CurvePhase::CollapseAcceleration)
    } else {
        return CurvePhase::Undetermined;
    };

    let Some(slope) = agreement(dydt_signs) else {
        return CurvePhase::Undetermined;
    };
    if slope > uniformity_threshold {
        rising
    } else if slope < -uniformity_threshold {
        falling
    } else {
        CurvePhase::Undetermined
    }
}

/// Signed fraction of samples agreeing with the majority direction; `None` when the signs cancel.
fn agreement(signs: &[i8]) -> Option<f64> {
    let sum: i64 = signs.iter().map(|&s| s as i64).sum();
    if sum == 0 {
        return None;
    }
    let direction = sum.signum();
    let agreeing = signs
        .iter()
        .filter(|&&s| if direction < 0 { s <= 0 } else { s >= 0 })
        .count();
    Some(agreeing as f64 / signs.len() as f64 * direction as f64)
}
