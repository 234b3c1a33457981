//! Deterministic synthetic data generation for tests and experiments.
//!
//! Every generator takes an explicit seed; equal seeds produce equal data.

use crate::rng::SeededLcg;

/// A random `{0,1}` pattern of the given length.
pub fn random_pattern(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = SeededLcg::new(seed);
    (0..len).map(|_| (rng.next_u64() & 1) as u8).collect()
}

/// One fixed random pattern per class, derived from a base seed.
pub fn class_patterns(seed: u64, classes: usize, len: usize) -> Vec<Vec<u8>> {
    (0..classes)
        .map(|class| random_pattern(seed.wrapping_add(class as u64).wrapping_mul(0x9E37), len))
        .collect()
}

/// A copy of `pattern` with `flips` distinct bit positions inverted.
pub fn noisy_copy(pattern: &[u8], flips: usize, seed: u64) -> Vec<u8> {
    let mut rng = SeededLcg::new(seed);
    let mut out = pattern.to_vec();
    for position in rng.sample_distinct(pattern.len(), flips.min(pattern.len())) {
        out[position as usize] ^= 1;
    }
    out
}

/// A two-dimensional drifting trajectory, `steps` samples long. Trajectories
/// with the same `class` share a drift direction, so each class traces a
/// distinguishable stroke family.
pub fn stroke(seed: u64, class: usize, steps: usize) -> Vec<Vec<f64>> {
    let mut rng = SeededLcg::new(seed.wrapping_mul(31).wrapping_add(class as u64));
    let heading = class as f64 * 1.7;
    let (dx, dy) = (heading.cos(), heading.sin());

    let mut x = 0.0;
    let mut y = 0.0;
    let mut samples = Vec::with_capacity(steps);
    for _ in 0..steps {
        x += dx * 0.1 + rng.next_symmetric() * 0.02;
        y += dy * 0.1 + rng.next_symmetric() * 0.02;
        samples.push(vec![x, y]);
    }
    samples
}
