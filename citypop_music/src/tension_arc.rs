// Per-step complexity curve.
//
// The curve rises toward a peak at floor(length / phi), the golden-ratio
// point of the progression, and falls away on either side. Each step gets a
// little noise and is clamped to [0.3, 0.9]. The orchestrator multiplies it
// by the template's complexity to decide how many tensions a chord gets.

use citypop_prng::UniformSource;

pub const MIN_TENSION: f64 = 0.3;
pub const MAX_TENSION: f64 = 0.9;

/// Index of the curve's peak for a progression of `length` steps.
pub fn peak_index(length: usize) -> usize {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    (length as f64 / phi).floor() as usize
}

/// The noise-free curve. Values can fall below 0.3 far from the peak on
/// long progressions; `generate` clamps.
pub fn base_curve(length: usize) -> Vec<f64> {
    let peak = peak_index(length) as f64;
    let half = length as f64 / 2.0;
    (0..length)
        .map(|i| 0.5 + 0.4 * (1.0 - (i as f64 - peak).abs() / half))
        .collect()
}

/// Noisy curve of `length` values in `[0.3, 0.9]`.
pub fn generate(length: usize, rng: &mut impl UniformSource) -> Vec<f64> {
    base_curve(length)
        .into_iter()
        .map(|base| (base + rng.centered(0.2)).clamp(MIN_TENSION, MAX_TENSION))
        .collect()
}
