//! Transform stages of the encoding pipeline.
//!
//! Stages form a closed set of tagged variants behind one dispatch; each
//! carries its own per-feature state and declares its output width at
//! assembly time so the chain's widths are checked once, not per sample.

/// A polymorphic transform node in the pipeline chain.
#[derive(Debug, Clone)]
pub enum Stage {
    ZScore(ZScore),
    Smooth(Smooth),
    Delta(Delta),
    Rotate(Rotate),
    Tanh(Tanh),
    Replicate(Replicate),
}

impl Stage {
    /// Resets per-session transient state. Called once per processing
    /// session, before the first `digest`.
    pub fn start(&mut self) {
        match self {
            Stage::ZScore(stage) => stage.start(),
            Stage::Smooth(stage) => stage.start(),
            Stage::Delta(stage) => stage.start(),
            Stage::Rotate(_) | Stage::Tanh(_) | Stage::Replicate(_) => {}
        }
    }

    /// Transforms one sample. The input length is guaranteed by the graph.
    pub fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        match self {
            Stage::ZScore(stage) => stage.digest(features),
            Stage::Smooth(stage) => stage.digest(features),
            Stage::Delta(stage) => stage.digest(features),
            Stage::Rotate(stage) => stage.digest(features),
            Stage::Tanh(stage) => stage.digest(features),
            Stage::Replicate(stage) => stage.digest(features),
        }
    }

    /// Flush hook, called once at end of session. No current stage buffers
    /// across samples, so this only exists to keep the session contract
    /// uniform with the terminal quantizer.
    pub fn finish(&mut self) {}

    /// Output width given the assembly-time input width.
    pub fn output_len(&self, input_len: usize) -> usize {
        match self {
            Stage::Replicate(stage) => input_len * stage.times,
            _ => input_len,
        }
    }
}

/// Standardizes the selected columns with running per-feature statistics.
///
/// Accumulators persist across the whole session; a column with zero
/// deviation emits `0.0` instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct ZScore {
    columns: Vec<usize>,
    count: u64,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl ZScore {
    pub fn new(columns: Vec<usize>) -> Self {
        let len = columns.len();
        Self {
            columns,
            count: 0,
            mean: vec![0.0; len],
            m2: vec![0.0; len],
        }
    }

    fn start(&mut self) {
        self.count = 0;
        self.mean.fill(0.0);
        self.m2.fill(0.0);
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        self.count += 1;
        let mut out = features.to_vec();
        for (j, &column) in self.columns.iter().enumerate() {
            let x = features[column];
            // Welford update.
            let delta = x - self.mean[j];
            self.mean[j] += delta / self.count as f64;
            self.m2[j] += delta * (x - self.mean[j]);

            let stdev = (self.m2[j] / self.count as f64).sqrt();
            out[column] = if stdev == 0.0 {
                0.0
            } else {
                (x - self.mean[j]) / stdev
            };
        }
        out
    }
}

/// Per-feature exponential moving average with a fixed decay factor.
#[derive(Debug, Clone)]
pub struct Smooth {
    alpha: f64,
    state: Option<Vec<f64>>,
}

impl Smooth {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    fn start(&mut self) {
        self.state = None;
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        match self.state.as_mut() {
            None => {
                // First sample seeds the average.
                self.state = Some(features.to_vec());
                features.to_vec()
            }
            Some(state) => {
                for (smoothed, &x) in state.iter_mut().zip(features) {
                    *smoothed += self.alpha * (x - *smoothed);
                }
                state.clone()
            }
        }
    }
}

/// Per-feature difference from the previous sample.
///
/// The first sample of a session has no predecessor and emits `0.0` for
/// every feature.
#[derive(Debug, Clone)]
pub struct Delta {
    previous: Option<Vec<f64>>,
}

impl Delta {
    pub fn new() -> Self {
        Self { previous: None }
    }

    fn start(&mut self) {
        self.previous = None;
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        let out = match self.previous.as_ref() {
            None => vec![0.0; features.len()],
            Some(previous) => features
                .iter()
                .zip(previous)
                .map(|(&x, &last)| x - last)
                .collect(),
        };
        self.previous = Some(features.to_vec());
        out
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed planar rotation of two selected columns.
#[derive(Debug, Clone)]
pub struct Rotate {
    col_x: usize,
    col_y: usize,
    cos: f64,
    sin: f64,
}

impl Rotate {
    pub fn new(col_x: usize, col_y: usize, angle_degrees: f64) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            col_x,
            col_y,
            cos: radians.cos(),
            sin: radians.sin(),
        }
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        let mut out = features.to_vec();
        let x = features[self.col_x];
        let y = features[self.col_y];
        out[self.col_x] = self.cos * x - self.sin * y;
        out[self.col_y] = self.sin * x + self.cos * y;
        out
    }
}

/// `tanh` squash on the selected columns, compressing range to `(-1, 1)`.
#[derive(Debug, Clone)]
pub struct Tanh {
    columns: Vec<usize>,
}

impl Tanh {
    pub fn new(columns: Vec<usize>) -> Self {
        Self { columns }
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        let mut out = features.to_vec();
        for &column in &self.columns {
            out[column] = features[column].tanh();
        }
        out
    }
}

/// Concatenates the incoming vector `times` times.
#[derive(Debug, Clone)]
pub struct Replicate {
    times: usize,
}

impl Replicate {
    pub fn new(times: usize) -> Self {
        Self { times }
    }

    fn digest(&mut self, features: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(features.len() * self.times);
        for _ in 0..self.times {
            out.extend_from_slice(features);
        }
        out
    }
}
