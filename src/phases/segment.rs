use anyhow::{Result, bail};
use tracing::debug;

use crate::math::runs::{Run, bridge_candidates, first_run, run_containing, runs};
use crate::phases::{
    CurvePhase, DerivativeSet, PhaseEdge, Thresholds, bridge_gaps, set_nonlinear_phase_type,
};

/// Per-curve inputs of the segmenter. All slices share the curve's length.
#[derive(Debug, Clone, Copy)]
pub struct SegmentInput<'a> {
    pub times: &'a [f64],
    /// Population size (linear scale); processed as log2.
    pub curve: &'a [f64],
    pub dydt: &'a [f64],
    pub dydt_signs_flat: &'a [i8],
    pub ddydt_signs: &'a [i8],
    pub offset: usize,
}

impl<'a> SegmentInput<'a> {
    pub fn new(times: &'a [f64], curve: &'a [f64], derivatives: &'a DerivativeSet) -> Self {
        Self {
            times,
            curve,
            dydt: &derivatives.dydt,
            dydt_signs_flat: &derivatives.dydt_signs_flat,
            ddydt_signs: &derivatives.ddydt_signs,
            offset: derivatives.offset,
        }
    }

    fn validate(&self) -> Result<()> {
        let n = self.curve.len();
        for (name, len) in [
            ("times", self.times.len()),
            ("dydt", self.dydt.len()),
            ("dydt_signs_flat", self.dydt_signs_flat.len()),
            ("ddydt_signs", self.ddydt_signs.len()),
        ] {
            if len != n {
                bail!("{} length mismatch: {} != {}", name, len, n);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStep {
    FlatMarked,
    LinearAttempt,
    FlankClassified,
    ResidualClassified,
    EdgesExtended,
    GapsBridged,
}

/// Receives the label array after every micro-step of a segmentation run.
pub trait SegmentObserver {
    fn on_step(&mut self, step: SegmentStep, phases: &[CurvePhase]);
}

impl SegmentObserver for () {
    fn on_step(&mut self, _step: SegmentStep, _phases: &[CurvePhase]) {}
}

pub fn segment(input: &SegmentInput<'_>, thresholds: &Thresholds) -> Result<Vec<CurvePhase>> {
    segment_with_observer(input, thresholds, &mut ())
}

/// Classifies every sample of one curve into a [`CurvePhase`].
///
/// Passes run in a fixed order and each only relabels samples that earlier
/// passes left undetermined:
///
/// 1. flat runs of zero first-derivative sign;
/// 2. repeatedly, the linear region around the steepest undetermined point,
///    followed by the non-linear phases flanking it;
/// 3. the remaining non-linear regions, tested from their most interesting edge;
/// 4. edge extension over the derivative offset and single-gap bridging.
///
/// Every outer iteration relabels at least one `UndeterminedNonFlat` sample, so
/// the run terminates.
pub fn segment_with_observer(
    input: &SegmentInput<'_>,
    thresholds: &Thresholds,
    observer: &mut dyn SegmentObserver,
) -> Result<Vec<CurvePhase>> {
    input.validate()?;
    let n = input.curve.len();
    let mut phases = vec![CurvePhase::Undetermined; n];
    if n == 0 {
        return Ok(phases);
    }
    let log_curve: Vec<f64> = input.curve.iter().map(|v| v.log2()).collect();

    set_flat_segments(input, thresholds, &mut phases);
    observer.on_step(SegmentStep::FlatMarked, &phases);

    while phases.contains(&CurvePhase::UndeterminedNonFlat) {
        let flanks = set_nonflat_linear_segment(input, &log_curve, thresholds, &mut phases);
        observer.on_step(SegmentStep::LinearAttempt, &phases);

        for (flank, edge) in flanks {
            let mask = flank.to_mask(n);
            let phase = set_nonlinear_phase_type(
                input.dydt,
                input.dydt_signs_flat,
                input.ddydt_signs,
                &mask,
                edge,
                thresholds,
                &mut phases,
            )?;
            if phase == CurvePhase::Undetermined {
                // No curved flank: later linear searches must not merge across it.
                for i in flank.indices() {
                    phases[i] = CurvePhase::UndeterminedNonLinear;
                }
            }
            observer.on_step(SegmentStep::FlankClassified, &phases);
        }
    }

    while let Some(region) = first_run_of(&phases, CurvePhase::UndeterminedNonLinear) {
        let mask = region.to_mask(n);
        let phase = set_nonlinear_phase_type(
            input.dydt,
            input.dydt_signs_flat,
            input.ddydt_signs,
            &mask,
            PhaseEdge::Intelligent,
            thresholds,
            &mut phases,
        )?;
        if phase == CurvePhase::Undetermined {
            for i in region.indices() {
                phases[i] = CurvePhase::Undetermined;
            }
        }
        observer.on_step(SegmentStep::ResidualClassified, &phases);
    }

    let offset = input.offset;
    if offset > 0 && n > 2 * offset {
        let left = phases[offset];
        let right = phases[n - offset - 1];
        phases[..offset].fill(left);
        phases[n - offset..].fill(right);
        observer.on_step(SegmentStep::EdgesExtended, &phases);
    }

    bridge_gaps(&mut phases);
    observer.on_step(SegmentStep::GapsBridged, &phases);

    Ok(phases)
}

fn first_run_of(phases: &[CurvePhase], target: CurvePhase) -> Option<Run> {
    let mask: Vec<bool> = phases.iter().map(|&p| p == target).collect();
    first_run(&mask)
}

fn set_flat_segments(input: &SegmentInput<'_>, thresholds: &Thresholds, phases: &mut [CurvePhase]) {
    phases.fill(CurvePhase::UndeterminedNonFlat);
    let candidates: Vec<bool> = input
        .dydt_signs_flat
        .iter()
        .zip(input.dydt)
        .map(|(&s, d)| s == 0 && d.is_finite())
        .collect();
    let flats = bridge_candidates(&candidates, thresholds.bridging_max_window);
    for run in runs(&flats) {
        if run.len() >= thresholds.phase_minimum_length {
            phases[run.left..run.right].fill(CurvePhase::Flat);
        }
    }
}

/// Grows an impulse or collapse around the steepest `UndeterminedNonFlat` point.
///
/// Returns the undetermined, sign-compatible regions flanking an accepted
/// linear segment together with the edge each should be tested from.
fn set_nonflat_linear_segment(
    input: &SegmentInput<'_>,
    log_curve: &[f64],
    thresholds: &Thresholds,
    phases: &mut [CurvePhase],
) -> Vec<(Run, PhaseEdge)> {
    let n = phases.len();
    let filt: Vec<bool> = phases
        .iter()
        .map(|&p| p == CurvePhase::UndeterminedNonFlat)
        .collect();

    let mut steepest: Option<(usize, f64)> = None;
    for (i, &d) in input.dydt.iter().enumerate() {
        if filt[i] && d.is_finite() && steepest.is_none_or(|(_, best)| d.abs() > best) {
            steepest = Some((i, d.abs()));
        }
    }
    let Some((loc, _)) = steepest else {
        mark(phases, &filt, CurvePhase::UndeterminedNonLinear);
        return Vec::new();
    };

    let loc_slope = input.dydt[loc];
    let loc_value = log_curve[loc];
    let loc_time = input.times[loc];
    let phase = if loc_slope < 0.0 {
        CurvePhase::Collapse
    } else {
        CurvePhase::Impulse
    };

    let tolerance = thresholds.linear_model_extension * loc_value.abs();
    let candidates: Vec<bool> = (0..n)
        .map(|i| {
            let tangent = (input.times[i] - loc_time) * loc_slope + loc_value;
            let dev = (log_curve[i] - tangent).abs();
            filt[i] && dev.is_finite() && dev < tolerance
        })
        .collect();
    let candidates: Vec<bool> = bridge_candidates(&candidates, thresholds.bridging_max_window)
        .into_iter()
        .zip(&filt)
        .map(|(c, &f)| c && f)
        .collect();

    if !candidates.contains(&true) {
        debug!(loc, "no linear candidates around steepest point");
        mark(phases, &filt, CurvePhase::UndeterminedNonLinear);
        return Vec::new();
    }
    let Some(elected) = run_containing(&candidates, loc) else {
        phases[loc] = CurvePhase::UndeterminedNonLinear;
        return Vec::new();
    };

    if elected.len() < thresholds.non_flat_linear_minimum_length {
        debug!(
            left = elected.left,
            right = elected.right,
            "linear candidate too short"
        );
        phases[elected.left..elected.right].fill(CurvePhase::UndeterminedNonLinear);
        return Vec::new();
    }

    // Flanks are taken from the undetermined state before the election is written.
    let border: Vec<bool> = (0..n)
        .map(|i| {
            let sign = input.dydt_signs_flat[i];
            let compatible = if phase == CurvePhase::Collapse {
                sign <= 0
            } else {
                sign >= 0
            };
            phases[i].is_undetermined() && compatible
        })
        .collect();

    phases[elected.left..elected.right].fill(phase);
    debug!(
        phase = %phase,
        left = elected.left,
        right = elected.right,
        "linear segment accepted"
    );

    let Some(component) = run_containing(&border, loc) else {
        return Vec::new();
    };
    let mut flanks = Vec::with_capacity(2);
    if component.left < elected.left {
        flanks.push((
            Run {
                left: component.left,
                right: elected.left,
            },
            PhaseEdge::Right,
        ));
    }
    if elected.right < component.right {
        flanks.push((
            Run {
                left: elected.right,
                right: component.right,
            },
            PhaseEdge::Left,
        ));
    }
    flanks
}

fn mark(phases: &mut [CurvePhase], mask: &[bool], phase: CurvePhase) {
    for (p, &m) in phases.iter_mut().zip(mask) {
        if m {
            *p = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_linear_candidate_is_demoted() {
        let times: Vec<f64> = (0..4).map(|i| i as f64).collect();
        let curve: Vec<f64> = (0..4).map(|i| 2f64.powf(10.0 + i as f64)).collect();
        let dydt = vec![1.0; 4];
        let signs = vec![1i8; 4];
        let dd = vec![0i8; 4];
        let input = SegmentInput {
            times: &times,
            curve: &curve,
            dydt: &dydt,
            dydt_signs_flat: &signs,
            ddydt_signs: &dd,
            offset: 0,
        };
        let mut phases = vec![CurvePhase::UndeterminedNonFlat; 4];
        let log_curve: Vec<f64> = curve.iter().map(|v| v.log2()).collect();
        let flanks =
            set_nonflat_linear_segment(&input, &log_curve, &Thresholds::default(), &mut phases);
        assert!(flanks.is_empty());
        assert!(phases.iter().all(|&p| p == CurvePhase::UndeterminedNonLinear));
    }
}
