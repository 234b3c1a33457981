//! Encoding pipeline: a source width, an ordered chain of transform stages,
//! and a terminal kernel canvas that emits the binary pattern.
//!
//! A processing session is `start()`, one `digest(features)` per sample,
//! then `finish()`, which paints nothing further, hands the terminal
//! pattern to every registered emitter, and returns it so a driver can pair
//! it with a label. All propagation is synchronous and in stage order.

pub mod canvas;
pub mod stage;

pub use canvas::{CanvasConfig, KernelCanvas};
pub use stage::{Delta, Replicate, Rotate, Smooth, Stage, Tanh, ZScore};

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::EngineError;

/// A registered consumer of the pipeline's terminal binary output.
pub trait PatternSink {
    fn consume(&mut self, pattern: &[u8]);
}

/// Emitter that keeps the most recent terminal pattern.
///
/// Clones share one buffer, so a driver can keep a handle while the
/// pipeline owns the registered clone.
#[derive(Debug, Clone, Default)]
pub struct PatternBuffer {
    last: Rc<RefCell<Option<Vec<u8>>>>,
}

impl PatternBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the most recent pattern, if any session finished
    /// since the last take.
    pub fn take(&self) -> Option<Vec<u8>> {
        self.last.borrow_mut().take()
    }
}

impl PatternSink for PatternBuffer {
    fn consume(&mut self, pattern: &[u8]) {
        *self.last.borrow_mut() = Some(pattern.to_vec());
    }
}

/// Assembles a pipeline stage by stage, tracking the running vector width
/// so every stage is sized at assembly time.
pub struct PipelineBuilder {
    input_len: usize,
    width: usize,
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    fn new(input_len: usize) -> Self {
        Self {
            input_len,
            width: input_len,
            stages: Vec::new(),
        }
    }

    /// Z-score standardization over every column.
    pub fn zscore(self) -> Self {
        let columns = (0..self.width).collect();
        self.zscore_columns(columns)
    }

    pub fn zscore_columns(mut self, columns: Vec<usize>) -> Self {
        self.push(Stage::ZScore(ZScore::new(columns)));
        self
    }

    /// Exponential smoothing with decay `alpha` in `(0, 1]`.
    pub fn smooth(mut self, alpha: f64) -> Self {
        self.push(Stage::Smooth(Smooth::new(alpha)));
        self
    }

    /// Per-feature difference from the previous sample.
    pub fn delta(mut self) -> Self {
        self.push(Stage::Delta(Delta::new()));
        self
    }

    /// Fixed rotation of the `(col_x, col_y)` plane.
    pub fn rotate(mut self, col_x: usize, col_y: usize, angle_degrees: f64) -> Self {
        self.push(Stage::Rotate(Rotate::new(col_x, col_y, angle_degrees)));
        self
    }

    /// `tanh` squash over every column.
    pub fn tanh(self) -> Self {
        let columns = (0..self.width).collect();
        self.tanh_columns(columns)
    }

    pub fn tanh_columns(mut self, columns: Vec<usize>) -> Self {
        self.push(Stage::Tanh(Tanh::new(columns)));
        self
    }

    /// Replicates the vector `times` times.
    pub fn replicate(mut self, times: usize) -> Self {
        self.push(Stage::Replicate(Replicate::new(times)));
        self
    }

    /// Terminates the chain with a kernel canvas and yields the pipeline.
    pub fn canvas(self, config: &CanvasConfig) -> Result<Pipeline, EngineError> {
        let canvas = KernelCanvas::new(self.width, config)?;
        Ok(Pipeline {
            input_len: self.input_len,
            stages: self.stages,
            canvas,
            emitters: Vec::new(),
            pattern: Vec::new(),
        })
    }

    fn push(&mut self, stage: Stage) {
        self.width = stage.output_len(self.width);
        self.stages.push(stage);
    }
}

/// The assembled graph: source width, stage chain, terminal canvas, and
/// registered emitters.
///
/// # Examples
///
/// ```
/// use ramnet::pipeline::{CanvasConfig, Pipeline};
///
/// let config = CanvasConfig { kernels: 64, activation: 0.05, term_bits: 2, seed: 7 };
/// let mut pipeline = Pipeline::from_source(2)
///     .zscore()
///     .smooth(0.3)
///     .delta()
///     .canvas(&config)
///     .unwrap();
///
/// pipeline.start();
/// pipeline.digest(&[0.1, 0.4]).unwrap();
/// pipeline.digest(&[0.2, 0.3]).unwrap();
/// let pattern = pipeline.finish();
/// assert_eq!(pattern.len(), pipeline.output_len());
/// ```
pub struct Pipeline {
    input_len: usize,
    stages: Vec<Stage>,
    canvas: KernelCanvas,
    emitters: Vec<Box<dyn PatternSink>>,
    pattern: Vec<u8>,
}

impl Pipeline {
    /// Starts assembling a pipeline fed by `input_len`-wide vectors.
    pub fn from_source(input_len: usize) -> PipelineBuilder {
        PipelineBuilder::new(input_len)
    }

    /// Registers a sink for the terminal binary pattern.
    pub fn add_emitter(&mut self, emitter: Box<dyn PatternSink>) {
        self.emitters.push(emitter);
    }

    /// Length of the terminal binary pattern, for sizing a classifier.
    pub fn output_len(&self) -> usize {
        self.canvas.output_len()
    }

    /// Begins a processing session: resets every stage and wipes the canvas.
    pub fn start(&mut self) {
        for stage in &mut self.stages {
            stage.start();
        }
        self.canvas.clear();
    }

    /// Pushes one sample through the chain into the canvas.
    pub fn digest(&mut self, features: &[f64]) -> Result<(), EngineError> {
        if features.is_empty() {
            return Err(EngineError::EmptyPattern);
        }
        if features.len() != self.input_len {
            return Err(EngineError::InvalidPattern {
                expected: self.input_len,
                actual: features.len(),
            });
        }

        let mut vector = features.to_vec();
        for stage in &mut self.stages {
            vector = stage.digest(&vector);
        }
        self.canvas.digest(&vector);
        Ok(())
    }

    /// Ends the session: flushes the stages, renders the terminal pattern,
    /// delivers it to every emitter, and returns it.
    pub fn finish(&mut self) -> &[u8] {
        for stage in &mut self.stages {
            stage.finish();
        }
        self.pattern = self.canvas.render();
        for emitter in &mut self.emitters {
            emitter.consume(&self.pattern);
        }
        &self.pattern
    }

    /// Runs one whole session over a sequence of samples.
    pub fn digest_all(&mut self, samples: &[Vec<f64>]) -> Result<&[u8], EngineError> {
        self.start();
        for sample in samples {
            self.digest(sample)?;
        }
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_canvas_config() -> CanvasConfig {
        CanvasConfig {
            kernels: 64,
            activation: 0.05,
            term_bits: 2,
            seed: 13,
        }
    }

    fn test_pipeline() -> Pipeline {
        Pipeline::from_source(2)
            .zscore()
            .smooth(0.4)
            .delta()
            .rotate(0, 1, 30.0)
            .tanh()
            .replicate(2)
            .canvas(&test_canvas_config())
            .unwrap()
    }

    #[test]
    fn output_len_reflects_canvas_geometry() {
        let pipeline = test_pipeline();
        assert_eq!(pipeline.output_len(), 128);
    }

    #[test]
    fn digest_rejects_wrong_width_vectors() {
        let mut pipeline = test_pipeline();
        pipeline.start();
        assert!(matches!(
            pipeline.digest(&[]),
            Err(EngineError::EmptyPattern)
        ));
        assert!(matches!(
            pipeline.digest(&[1.0, 2.0, 3.0]),
            Err(EngineError::InvalidPattern { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn sessions_are_deterministic_and_independent() {
        let samples: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![(i as f64 * 0.37).sin(), (i as f64 * 0.21).cos()])
            .collect();

        let mut pipeline = test_pipeline();
        let first = pipeline.digest_all(&samples).unwrap().to_vec();
        let second = pipeline.digest_all(&samples).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn finish_broadcasts_to_every_emitter() {
        let first = PatternBuffer::new();
        let second = PatternBuffer::new();

        let mut pipeline = test_pipeline();
        pipeline.add_emitter(Box::new(first.clone()));
        pipeline.add_emitter(Box::new(second.clone()));

        pipeline.start();
        pipeline.digest(&[0.5, -0.5]).unwrap();
        let pattern = pipeline.finish().to_vec();

        assert_eq!(first.take().unwrap(), pattern);
        assert_eq!(second.take().unwrap(), pattern);
    }

    #[test]
    fn pattern_bits_are_binary() {
        let mut pipeline = test_pipeline();
        pipeline.start();
        pipeline.digest(&[0.5, -0.5]).unwrap();
        pipeline.digest(&[0.1, 0.9]).unwrap();
        let pattern = pipeline.finish();
        assert!(pattern.iter().all(|&b| b == 0 || b == 1));
        assert!(pattern.iter().any(|&b| b == 1));
    }
}
