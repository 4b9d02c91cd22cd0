use std::error::Error;
use std::fmt;

/// Errors raised by the core pipeline stages.
#[derive(Debug)]
pub enum PipelineError {
    /// Two row- or column-aligned structures disagree on their extent.
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
    /// An operation received an empty matrix or vector it cannot work on.
    EmptyInput(&'static str),
    /// The optimizer produced non-finite weights or loss.
    NonFiniteModel,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::ShapeMismatch { what, left, right } => {
                write!(f, "shape mismatch for {}: {} vs {}", what, left, right)
            }
            PipelineError::EmptyInput(what) => write!(f, "empty input: {}", what),
            PipelineError::NonFiniteModel => {
                write!(f, "optimizer produced non-finite weights or loss")
            }
        }
    }
}

impl Error for PipelineError {}
