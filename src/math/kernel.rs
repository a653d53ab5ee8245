//! Convolution helpers for derivative smoothing.

/// Symmetric Gaussian window of `taps` samples, normalised to sum 1.
pub fn gaussian_kernel(taps: usize, std: f64) -> Vec<f64> {
    if taps == 0 {
        return Vec::new();
    }
    let center = (taps as f64 - 1.0) / 2.0;
    let mut kernel: Vec<f64> = (0..taps)
        .map(|i| {
            let d = (i as f64 - center) / std;
            (-0.5 * d * d).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Discrete convolution restricted to full overlap (`valid` mode).
///
/// Output length is `signal.len() - kernel.len() + 1`; empty when the signal is
/// shorter than the kernel.
pub fn convolve_valid(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let k = kernel.len();
    if k == 0 || signal.len() < k {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(signal.len() - k + 1);
    for start in 0..=(signal.len() - k) {
        let mut acc = 0.0;
        for (j, &w) in kernel.iter().enumerate() {
            // kernel is flipped relative to the signal window
            acc += signal[start + k - 1 - j] * w;
        }
        out.push(acc);
    }
    out
}

/// Re-expands `values` to `target_len` by repeating its first and last samples,
/// the extra sample of an odd difference going to the right.
pub fn pad_edges(values: &[f64], target_len: usize) -> Vec<f64> {
    if values.is_empty() || values.len() >= target_len {
        return values.to_vec();
    }
    let missing = target_len - values.len();
    let left = missing / 2;
    let right = missing - left;
    let mut out = Vec::with_capacity(target_len);
    out.extend(std::iter::repeat_n(values[0], left));
    out.extend_from_slice(values);
    out.extend(std::iter::repeat_n(values[values.len() - 1], right));
    out
}

/// Median filter over a boolean mask with zero padding outside the array.
pub fn median_filter_bool(mask: &[bool], window: usize) -> Vec<bool> {
    let half = window / 2;
    let n = mask.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n.saturating_sub(1));
            let count = mask[lo..=hi].iter().filter(|&&v| v).count();
            count > half
        })
        .collect()
}
