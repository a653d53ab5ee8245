use crate::phases::CurvePhase;

/// Fills single `Undetermined` samples whose neighbours agree on a phase.
///
/// End samples take their only neighbour's phase when it is determined.
/// Curves shorter than three samples are left as they are. Running this twice
/// gives the same result as running it once.
pub fn bridge_gaps(phases: &mut [CurvePhase]) {
    if phases.len() < 3 {
        return;
    }
    let last = phases.len() - 1;
    for loc in 0..=last {
        if phases[loc] != CurvePhase::Undetermined {
            continue;
        }
        let fill = if loc == 0 {
            phases[1]
        } else if loc == last {
            phases[last - 1]
        } else if phases[loc - 1] == phases[loc + 1] {
            phases[loc + 1]
        } else {
            continue;
        };
        if fill != CurvePhase::Undetermined {
            phases[loc] = fill;
        }
    }
}
