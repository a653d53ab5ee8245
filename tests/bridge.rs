use kira_growthphase::phases::{CurvePhase, bridge_gaps};

use CurvePhase::{Flat, Impulse, Undetermined};

#[test]
fn single_gap_between_equal_phases_is_bridged() {
    let mut phases = vec![Flat, Flat, Undetermined, Flat, Flat];
    bridge_gaps(&mut phases);
    assert_eq!(phases, vec![Flat; 5]);
}

#[test]
fn gap_between_different_phases_stays() {
    let mut phases = vec![Flat, Undetermined, Impulse];
    bridge_gaps(&mut phases);
    assert_eq!(phases, vec![Flat, Undetermined, Impulse]);
}

#[test]
fn ends_take_neighbour_phase() {
    let mut phases = vec![Undetermined, Flat, Flat, Impulse, Undetermined];
    bridge_gaps(&mut phases);
    assert_eq!(phases, vec![Flat, Flat, Flat, Impulse, Impulse]);
}

#[test]
fn short_curves_are_untouched() {
    let mut phases = vec![Undetermined, Flat];
    bridge_gaps(&mut phases);
    assert_eq!(phases, vec![Undetermined, Flat]);
}

#[test]
fn bridging_is_idempotent() {
    let mut once = vec![
        Undetermined,
        Flat,
        Undetermined,
        Impulse,
        Undetermined,
        Impulse,
        Undetermined,
        Undetermined,
    ];
    bridge_gaps(&mut once);
    let mut twice = once.clone();
    bridge_gaps(&mut twice);
    assert_eq!(once, twice);
}
