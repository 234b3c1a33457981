//! Error taxonomy for the classifier engine and the encoding pipeline.
//!
//! All failures are reported synchronously to the caller; nothing in the
//! crate retries internally.

use std::fmt;
use std::io;

/// Errors surfaced by the classifier and the encoding pipeline.
#[derive(Debug)]
pub enum EngineError {
    /// A pattern (or pipeline input vector) had the wrong length.
    InvalidPattern { expected: usize, actual: usize },
    /// A pattern was empty.
    EmptyPattern,
    /// A class id outside `0..classes` was supplied.
    InvalidTarget { target: usize, classes: usize },
    /// An operation was invoked on a classifier after `close()`.
    ClosedResource,
    /// Export or import failed at the I/O layer.
    Io(io::Error),
    /// An import file was truncated or carried out-of-range values.
    Corrupted(String),
    /// A rank query asked for a deeper rank than the model has classes.
    InsufficientClasses { classes: usize, rank: usize },
    /// A read parameter was out of its documented range.
    InvalidParameter(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidPattern { expected, actual } => {
                write!(f, "pattern has {} bits, classifier expects {}", actual, expected)
            }
            EngineError::EmptyPattern => write!(f, "pattern is empty"),
            EngineError::InvalidTarget { target, classes } => {
                write!(f, "target {} is outside 0..{}", target, classes)
            }
            EngineError::ClosedResource => write!(f, "classifier is closed"),
            EngineError::Io(err) => write!(f, "I/O error: {}", err),
            EngineError::Corrupted(detail) => write!(f, "corrupted model file: {}", detail),
            EngineError::InsufficientClasses { classes, rank } => {
                write!(f, "rank {} query on a {}-class model", rank, classes)
            }
            EngineError::InvalidParameter(detail) => write!(f, "invalid parameter: {}", detail),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(value: io::Error) -> Self {
        EngineError::Io(value)
    }
}
