use crate::math::kernel::{convolve_valid, gaussian_kernel, pad_edges};
use crate::math::stats::{sign_with_dead_zone, std_population};
use crate::phases::Thresholds;

pub const GAUSS_TAPS: usize = 7;
pub const GAUSS_STD: f64 = 3.0;

/// Smoothed derivatives of one log2 growth curve, aligned to the curve's time axis.
#[derive(Debug, Clone)]
pub struct DerivativeSet {
    pub dydt: Vec<f64>,
    pub dydt_signs_flat: Vec<i8>,
    pub ddydt: Vec<f64>,
    pub ddydt_signs: Vec<i8>,
    /// Samples at each end of the curve for which the derivatives are undefined.
    pub offset: usize,
}

/// Derivative of `log2(curve)` over `times` (forward, central, backward differences).
pub fn finite_difference(times: &[f64], curve: &[f64]) -> Vec<f64> {
    let n = curve.len().min(times.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let y: Vec<f64> = curve[..n].iter().map(|v| v.log2()).collect();
    let mut out = Vec::with_capacity(n);
    out.push((y[1] - y[0]) / (times[1] - times[0]));
    for i in 1..n - 1 {
        out.push((y[i + 1] - y[i - 1]) / (times[i + 1] - times[i - 1]));
    }
    out.push((y[n - 1] - y[n - 2]) / (times[n - 1] - times[n - 2]));
    out
}

/// Derivative set of one curve, from `raw_derivative` when one is supplied and
/// from finite differences of `log2(curve)` otherwise.
pub fn curve_derivatives(
    times: &[f64],
    curve: &[f64],
    raw_derivative: Option<&[f64]>,
    thresholds: &Thresholds,
) -> DerivativeSet {
    match raw_derivative {
        Some(raw) if !raw.is_empty() => prepare_derivatives(curve.len(), raw, thresholds),
        _ => prepare_derivatives(curve.len(), &finite_difference(times, curve), thresholds),
    }
}

/// Re-smooths the supplied first derivative and derives the second derivative.
///
/// Both are edge-padded back to `n_samples`, so the returned `offset` is 0.
/// Callers handing trimmed arrays straight to the segmenter set it themselves.
///
/// Flat stretches shorter than the kernel width do not survive smoothing: the
/// slope of a neighbouring rise bleeds into them.
pub fn prepare_derivatives(
    n_samples: usize,
    raw_derivative: &[f64],
    thresholds: &Thresholds,
) -> DerivativeSet {
    let gauss = gaussian_kernel(GAUSS_TAPS, GAUSS_STD);

    let smoothed = convolve_valid(raw_derivative, &gauss);
    let smoothed = if smoothed.is_empty() {
        raw_derivative.to_vec()
    } else {
        smoothed
    };
    let dydt = fit_length(&smoothed, n_samples);

    let ddydt = convolve_valid(&convolve_valid(&dydt, &[1.0, 0.0, -1.0]), &gauss);
    let ddydt = if ddydt.is_empty() {
        vec![0.0; dydt.len()]
    } else {
        fit_length(&ddydt, dydt.len())
    };

    let dd_dead_zone = thresholds.second_derivative_sigma_as_not_zero * std_population(&ddydt);
    let dd_dead_zone = if dd_dead_zone.is_finite() {
        dd_dead_zone
    } else {
        0.0
    };
    let ddydt_signs = ddydt
        .iter()
        .map(|&v| sign_with_dead_zone(v, dd_dead_zone))
        .collect();
    let dydt_signs_flat = dydt
        .iter()
        .map(|&v| sign_with_dead_zone(v, thresholds.flatline_slope_requirement))
        .collect();

    DerivativeSet {
        dydt,
        dydt_signs_flat,
        ddydt,
        ddydt_signs,
        offset: 0,
    }
}

fn fit_length(values: &[f64], n: usize) -> Vec<f64> {
    if values.is_empty() {
        return vec![f64::NAN; n];
    }
    if values.len() > n {
        let left = (values.len() - n) / 2;
        return values[left..left + n].to_vec();
    }
    pad_edges(values, n)
}
