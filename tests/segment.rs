use kira_growthphase::phases::{
    CurvePhase, SegmentInput, SegmentObserver, SegmentStep, Thresholds, segment,
    segment_with_observer,
};
use kira_growthphase::phenotypes::phase_phenotypes;

struct Fixture {
    times: Vec<f64>,
    curve: Vec<f64>,
    dydt: Vec<f64>,
    signs: Vec<i8>,
    dd_signs: Vec<i8>,
}

impl Fixture {
    fn input(&self) -> SegmentInput<'_> {
        SegmentInput {
            times: &self.times,
            curve: &self.curve,
            dydt: &self.dydt,
            dydt_signs_flat: &self.signs,
            ddydt_signs: &self.dd_signs,
            offset: 0,
        }
    }
}

fn sign(v: f64, dead_zone: f64) -> i8 {
    if v.abs() < dead_zone {
        0
    } else if v > 0.0 {
        1
    } else {
        -1
    }
}

/// Five flat samples at log2 size 10, then ten samples rising one doubling per time unit.
fn flat_then_impulse() -> Fixture {
    let times: Vec<f64> = (0..15).map(|i| i as f64).collect();
    let log2: Vec<f64> = (0..15)
        .map(|i| if i < 5 { 10.0 } else { i as f64 + 6.0 })
        .collect();
    let dydt: Vec<f64> = (0..15).map(|i| if i < 5 { 0.0 } else { 1.0 }).collect();
    Fixture {
        curve: log2.iter().map(|v| 2f64.powf(*v)).collect(),
        signs: dydt.iter().map(|&v| sign(v, 0.02)).collect(),
        dd_signs: vec![0; 15],
        times,
        dydt,
    }
}

/// Quadratic acceleration up to t = 8 joining a straight line of slope 0.8.
fn acceleration_then_impulse() -> Fixture {
    let times: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let log2: Vec<f64> = times
        .iter()
        .map(|&t| {
            if t <= 8.0 {
                10.0 + 0.05 * t * t
            } else {
                13.2 + 0.8 * (t - 8.0)
            }
        })
        .collect();
    let dydt: Vec<f64> = times
        .iter()
        .map(|&t| if t < 8.0 { 0.1 * t } else { 0.8 })
        .collect();
    Fixture {
        curve: log2.iter().map(|v| 2f64.powf(*v)).collect(),
        signs: dydt.iter().map(|&v| sign(v, 0.02)).collect(),
        dd_signs: times.iter().map(|&t| if t < 8.0 { 1 } else { 0 }).collect(),
        times,
        dydt,
    }
}

fn logistic_curve(n: usize) -> (Vec<f64>, Vec<f64>) {
    let times: Vec<f64> = (0..n).map(|i| i as f64 / 3.0).collect();
    let curve = times
        .iter()
        .map(|&t| 2f64.powf(10.0 + 5.0 / (1.0 + (-(t - 10.0) / 1.5).exp())))
        .collect();
    (times, curve)
}

#[test]
fn flat_then_impulse_scenario() {
    let fx = flat_then_impulse();
    let phases = segment(&fx.input(), &Thresholds::default()).unwrap();
    let mut expected = vec![CurvePhase::Flat; 5];
    expected.extend(vec![CurvePhase::Impulse; 10]);
    assert_eq!(phases, expected);
}

#[test]
fn acceleration_flank_is_classified() {
    let fx = acceleration_then_impulse();
    let phases = segment(&fx.input(), &Thresholds::default()).unwrap();
    let mut expected = vec![CurvePhase::GrowthAcceleration; 7];
    expected.extend(vec![CurvePhase::Impulse; 13]);
    assert_eq!(phases, expected);
}

#[test]
fn declining_line_is_a_collapse() {
    let times: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let curve: Vec<f64> = times.iter().map(|t| 2f64.powf(20.0 - 0.5 * t)).collect();
    let dydt = vec![-0.5; 12];
    let fx = Fixture {
        signs: vec![-1; 12],
        dd_signs: vec![0; 12],
        times,
        curve,
        dydt,
    };
    let phases = segment(&fx.input(), &Thresholds::default()).unwrap();
    assert_eq!(phases, vec![CurvePhase::Collapse; 12]);
}

#[test]
fn empty_curve_gives_empty_labels() {
    let fx = Fixture {
        times: Vec::new(),
        curve: Vec::new(),
        dydt: Vec::new(),
        signs: Vec::new(),
        dd_signs: Vec::new(),
    };
    assert!(segment(&fx.input(), &Thresholds::default()).unwrap().is_empty());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let mut fx = flat_then_impulse();
    fx.dydt.pop();
    let err = segment(&fx.input(), &Thresholds::default()).unwrap_err();
    assert!(err.to_string().contains("dydt length mismatch"));
}

#[test]
fn every_sample_is_resolved() {
    let (times, curve) = logistic_curve(90);
    let analysis = phase_phenotypes(&times, &curve, None, 5.0, &Thresholds::default()).unwrap();
    assert_eq!(analysis.phases.len(), 90);
    assert!(analysis.phases.iter().all(|p| !matches!(
        p,
        CurvePhase::UndeterminedNonFlat | CurvePhase::UndeterminedNonLinear | CurvePhase::Multiple
    )));
    assert!(analysis.phases.contains(&CurvePhase::Impulse));
}

#[test]
fn noisy_curve_terminates_with_full_coverage() {
    let times: Vec<f64> = (0..40).map(|i| i as f64 / 2.0).collect();
    let curve: Vec<f64> = times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let wobble = if i % 3 == 0 { 0.15 } else { -0.1 };
            2f64.powf(8.0 + 0.2 * t + wobble)
        })
        .collect();
    let analysis = phase_phenotypes(&times, &curve, None, 4.0, &Thresholds::default()).unwrap();
    assert_eq!(analysis.phases.len(), 40);
    assert!(analysis.phases.iter().all(|p| !matches!(
        p,
        CurvePhase::UndeterminedNonFlat | CurvePhase::UndeterminedNonLinear
    )));
}

#[derive(Default)]
struct Recorder {
    steps: Vec<SegmentStep>,
    last: Vec<CurvePhase>,
    history: Vec<(SegmentStep, Vec<CurvePhase>)>,
}

impl SegmentObserver for Recorder {
    fn on_step(&mut self, step: SegmentStep, phases: &[CurvePhase]) {
        self.steps.push(step);
        self.last = phases.to_vec();
        self.history.push((step, phases.to_vec()));
    }
}

/// Pure quadratic acceleration: every tangent fits at most two samples.
fn curving_without_linear_part(dd_sign: i8) -> Fixture {
    let times: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let dydt: Vec<f64> = times.iter().map(|&t| 0.1 * t).collect();
    Fixture {
        curve: times.iter().map(|&t| 2f64.powf(10.0 + 0.05 * t * t)).collect(),
        signs: dydt.iter().map(|&v| sign(v, 0.02)).collect(),
        dd_signs: vec![dd_sign; 12],
        times,
        dydt,
    }
}

#[test]
fn residual_sweep_resolves_nonlinear_leftovers() {
    let fx = curving_without_linear_part(1);
    let mut recorder = Recorder::default();
    let phases =
        segment_with_observer(&fx.input(), &Thresholds::default(), &mut recorder).unwrap();

    let (_, before_sweep) = recorder
        .history
        .iter()
        .rev()
        .find(|(step, _)| *step == SegmentStep::LinearAttempt)
        .unwrap();
    assert!(before_sweep.iter().all(|&p| p == CurvePhase::UndeterminedNonLinear));
    assert!(recorder.steps.contains(&SegmentStep::ResidualClassified));
    assert_eq!(phases, vec![CurvePhase::GrowthAcceleration; 12]);
}

#[test]
fn residual_sweep_failure_is_undetermined() {
    let fx = curving_without_linear_part(0);
    let phases = segment(&fx.input(), &Thresholds::default()).unwrap();
    assert_eq!(phases, vec![CurvePhase::Undetermined; 12]);
}

#[test]
fn observer_sees_every_pass() {
    let fx = acceleration_then_impulse();
    let mut recorder = Recorder::default();
    let phases =
        segment_with_observer(&fx.input(), &Thresholds::default(), &mut recorder).unwrap();
    assert_eq!(recorder.steps.first(), Some(&SegmentStep::FlatMarked));
    assert!(recorder.steps.contains(&SegmentStep::LinearAttempt));
    assert!(recorder.steps.contains(&SegmentStep::FlankClassified));
    assert_eq!(recorder.steps.last(), Some(&SegmentStep::GapsBridged));
    assert_eq!(recorder.last, phases);
}
