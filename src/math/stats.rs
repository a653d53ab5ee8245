//! Small numeric primitives shared by derivative preparation and the phenotyper.
//!
//! Non-finite samples are skipped unless stated otherwise.

pub fn mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Population standard deviation (ddof = 0) of the finite samples.
pub fn std_population(values: &[f64]) -> f64 {
    let m = mean(values);
    if !m.is_finite() {
        return f64::NAN;
    }
    let mut acc = 0.0;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            acc += (v - m) * (v - m);
            n += 1;
        }
    }
    (acc / n as f64).sqrt()
}

/// Three-valued sign with a dead zone: `|v| < dead_zone` and non-finite values map to 0.
pub fn sign_with_dead_zone(v: f64, dead_zone: f64) -> i8 {
    if !v.is_finite() || v.abs() < dead_zone || v == 0.0 {
        0
    } else if v > 0.0 {
        1
    } else {
        -1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn undefined() -> Self {
        Self {
            slope: f64::NAN,
            intercept: f64::NAN,
        }
    }
}

/// Ordinary least squares of `y` against `x` over pairs where both are finite.
pub fn linregress(x: &[f64], y: &[f64]) -> LinearFit {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return LinearFit::undefined();
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(a, b) in &pairs {
        sxx += (a - mx) * (a - mx);
        sxy += (a - mx) * (b - my);
    }
    if sxx <= 0.0 {
        return LinearFit::undefined();
    }
    let slope = sxy / sxx;
    LinearFit {
        slope,
        intercept: my - slope * mx,
    }
}
