//! Connected components over 1-D boolean masks.
//!
//! Every classifier pass and the phenotyper group indices into maximal runs
//! through this module.

use anyhow::{Result, bail};

use crate::math::kernel::median_filter_bool;

/// Half-open index range `[left, right)` of one maximal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub left: usize,
    pub right: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.right - self.left
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.left..self.right
    }

    pub fn to_mask(&self, n: usize) -> Vec<bool> {
        let mut mask = vec![false; n];
        for i in self.indices() {
            mask[i] = true;
        }
        mask
    }
}

/// All maximal runs of `true`, left to right.
pub fn runs(mask: &[bool]) -> Vec<Run> {
    runs_where(mask, |&v| v)
}

/// All maximal runs of elements satisfying `pred`, left to right.
pub fn runs_where<T>(values: &[T], pred: impl Fn(&T) -> bool) -> Vec<Run> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match (pred(v), start) {
            (true, None) => start = Some(i),
            (false, Some(left)) => {
                out.push(Run { left, right: i });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(left) = start {
        out.push(Run {
            left,
            right: values.len(),
        });
    }
    out
}

pub fn first_run(mask: &[bool]) -> Option<Run> {
    runs(mask).into_iter().next()
}

pub fn run_containing(mask: &[bool], idx: usize) -> Option<Run> {
    if idx >= mask.len() || !mask[idx] {
        return None;
    }
    let mut left = idx;
    while left > 0 && mask[left - 1] {
        left -= 1;
    }
    let mut right = idx + 1;
    while right < mask.len() && mask[right] {
        right += 1;
    }
    Some(Run { left, right })
}

/// Edges of a mask that must describe at most one run.
///
/// More than one run breaks the index arithmetic of the callers and is a hard error.
pub fn locate_single_run(mask: &[bool]) -> Result<Option<Run>> {
    let found = runs(mask);
    match found.len() {
        0 => Ok(None),
        1 => Ok(Some(found[0])),
        n => bail!(
            "filter is not homogeneous, contains {} segments ({:?})",
            n,
            found
        ),
    }
}

/// Morphological closing of short gaps: a union with successive median filters
/// of odd widths 3..=`max_window`.
///
/// Clean run edges are never widened, only interior gaps get absorbed.
pub fn bridge_candidates(mask: &[bool], max_window: usize) -> Vec<bool> {
    let mut out = mask.to_vec();
    let mut window = 3;
    while window <= max_window {
        let filtered = median_filter_bool(&out, window);
        for (o, f) in out.iter_mut().zip(filtered) {
            *o = *o || f;
        }
        window += 2;
    }
    out
}

const CONSENSUS_MAX_GAP: usize = 3;
const CONSENSUS_MIN_LENGTH: usize = 3;

/// Local consensus over a `size`-wide window (nearest-edge padding).
///
/// A position is kept when its window holds a run of at least three members,
/// where gaps shorter than three samples do not break the run. Isolated members
/// are dropped and short holes are filled.
pub fn consensus_filter(mask: &[bool], size: usize) -> Vec<bool> {
    let n = mask.len();
    if n == 0 {
        return Vec::new();
    }
    let half = (size / 2) as isize;
    let mut window = Vec::with_capacity(size);
    (0..n)
        .map(|i| {
            window.clear();
            for d in -half..=half {
                let j = (i as isize + d).clamp(0, n as isize - 1) as usize;
                window.push(mask[j]);
            }
            window_has_consensus(&window)
        })
        .collect()
}

fn window_has_consensus(window: &[bool]) -> bool {
    let Some(first) = window.iter().position(|&v| v) else {
        return false;
    };
    let last = window.iter().rposition(|&v| v).unwrap_or(first);
    let span = &window[first..=last];
    let reach = (CONSENSUS_MAX_GAP / 2) as isize;
    let kept: Vec<bool> = (0..span.len() as isize)
        .map(|i| {
            let gaps = (i - reach..=i + reach)
                .filter(|&j| j >= 0 && (j as usize) < span.len() && !span[j as usize])
                .count();
            gaps < CONSENSUS_MAX_GAP
        })
        .collect();
    runs(&kept)
        .iter()
        .any(|r| r.len() >= CONSENSUS_MIN_LENGTH)
}
