//! Terminal quantizer: a kernel canvas mapping continuous vectors into a
//! fixed-length binary pattern.

use ndarray::Array2;

use crate::error::EngineError;
use crate::rng::SeededLcg;

/// Canvas parameters.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Number of reference kernels.
    pub kernels: usize,
    /// Fraction of kernels marked per digested sample, in `(0, 1]`.
    pub activation: f64,
    /// Replication factor of the canvas bits in the terminal pattern.
    pub term_bits: usize,
    /// Seed for the kernel bank.
    pub seed: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            kernels: 1024,
            activation: 0.01,
            term_bits: 16,
            seed: 42,
        }
    }
}

/// A bank of reference kernels plus the marks a session has painted.
///
/// Each digested vector marks its `k = ceil(kernels * activation)` nearest
/// kernels (squared Euclidean distance, index order on ties). Marks
/// accumulate across a session; the binary output is the canvas replicated
/// `term_bits` times, giving an `kernels * term_bits`-bit pattern.
#[derive(Debug, Clone)]
pub struct KernelCanvas {
    kernels: Array2<f64>,
    k: usize,
    term_bits: usize,
    marks: Vec<u8>,
}

impl KernelCanvas {
    /// Builds a canvas for `dims`-dimensional inputs. The kernel bank is
    /// drawn uniformly from `[-1, 1]` with the config's seed.
    pub fn new(dims: usize, config: &CanvasConfig) -> Result<Self, EngineError> {
        if dims == 0 {
            return Err(EngineError::InvalidParameter(
                "canvas input dimensionality must be at least 1".into(),
            ));
        }
        if config.kernels == 0 {
            return Err(EngineError::InvalidParameter(
                "canvas needs at least one kernel".into(),
            ));
        }
        if !(config.activation > 0.0 && config.activation <= 1.0) {
            return Err(EngineError::InvalidParameter(
                "activation must be in (0, 1]".into(),
            ));
        }
        if config.term_bits == 0 {
            return Err(EngineError::InvalidParameter(
                "term_bits must be at least 1".into(),
            ));
        }

        let mut rng = SeededLcg::new(config.seed);
        let kernels = Array2::from_shape_fn((config.kernels, dims), |_| rng.next_symmetric());
        let k = ((config.kernels as f64) * config.activation).ceil() as usize;

        Ok(Self {
            kernels,
            k: k.max(1),
            term_bits: config.term_bits,
            marks: vec![0; config.kernels],
        })
    }

    /// Wipes the canvas for a new session.
    pub fn clear(&mut self) {
        self.marks.fill(0);
    }

    /// Marks the `k` nearest kernels for one sample.
    pub fn digest(&mut self, features: &[f64]) {
        debug_assert_eq!(features.len(), self.kernels.ncols());

        let mut ranked: Vec<(f64, usize)> = self
            .kernels
            .outer_iter()
            .enumerate()
            .map(|(index, kernel)| {
                let distance = kernel
                    .iter()
                    .zip(features)
                    .map(|(&a, &b)| (a - b) * (a - b))
                    .sum::<f64>();
                (distance, index)
            })
            .collect();
        ranked.sort_unstable_by(|a, b| a.partial_cmp(b).expect("distances are finite"));

        for &(_, index) in ranked.iter().take(self.k) {
            self.marks[index] = 1;
        }
    }

    /// The session's binary pattern: canvas bits replicated `term_bits`
    /// times.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.output_len());
        for _ in 0..self.term_bits {
            out.extend_from_slice(&self.marks);
        }
        out
    }

    pub fn output_len(&self) -> usize {
        self.marks.len() * self.term_bits
    }

    pub fn dims(&self) -> usize {
        self.kernels.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> CanvasConfig {
        CanvasConfig {
            kernels: 32,
            activation: 0.1,
            term_bits: 2,
            seed,
        }
    }

    #[test]
    fn construction_validates_parameters() {
        assert!(KernelCanvas::new(0, &small_config(1)).is_err());
        let mut bad = small_config(1);
        bad.activation = 0.0;
        assert!(KernelCanvas::new(2, &bad).is_err());
        let mut bad = small_config(1);
        bad.term_bits = 0;
        assert!(KernelCanvas::new(2, &bad).is_err());
    }

    #[test]
    fn digest_marks_exactly_k_kernels_per_sample() {
        let mut canvas = KernelCanvas::new(2, &small_config(11)).unwrap();
        canvas.clear();
        canvas.digest(&[0.3, -0.2]);
        let marked: usize = canvas.marks.iter().map(|&m| m as usize).sum();
        // ceil(32 * 0.1) = 4
        assert_eq!(marked, 4);
    }

    #[test]
    fn marks_accumulate_within_a_session_and_clear_between() {
        let mut canvas = KernelCanvas::new(2, &small_config(11)).unwrap();
        canvas.clear();
        canvas.digest(&[0.9, 0.9]);
        canvas.digest(&[-0.9, -0.9]);
        let accumulated: usize = canvas.marks.iter().map(|&m| m as usize).sum();
        assert!(accumulated > 4);

        canvas.clear();
        assert!(canvas.marks.iter().all(|&m| m == 0));
    }

    #[test]
    fn render_replicates_the_canvas() {
        let mut canvas = KernelCanvas::new(2, &small_config(11)).unwrap();
        canvas.clear();
        canvas.digest(&[0.1, 0.1]);
        let pattern = canvas.render();
        assert_eq!(pattern.len(), 64);
        assert_eq!(&pattern[..32], &pattern[32..]);
    }

    #[test]
    fn equal_seeds_build_identical_banks() {
        let mut a = KernelCanvas::new(3, &small_config(5)).unwrap();
        let mut b = KernelCanvas::new(3, &small_config(5)).unwrap();
        a.clear();
        b.clear();
        a.digest(&[0.5, 0.0, -0.5]);
        b.digest(&[0.5, 0.0, -0.5]);
        assert_eq!(a.render(), b.render());

        let c = KernelCanvas::new(3, &small_config(6)).unwrap();
        assert_ne!(a.kernels, c.kernels);
    }
}
