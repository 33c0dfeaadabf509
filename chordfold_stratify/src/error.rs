// Error type for the stratification core.
//
// Only precondition violations are errors. Convergence and budget exhaustion
// are normal outcomes reported through `evolve::Termination`, and zero-mass
// classes are absorbed inside `fitness.rs` rather than raised.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum StratifyError {
    /// A size parameter (`pop_size`, `n_iter`, `num_folds`) was zero.
    ZeroParameter(&'static str),
    /// More folds than a candidate can index.
    TooManyFolds(usize),
    /// `fitness_penalty` must be finite and strictly positive.
    InvalidPenalty(f64),
    /// `mutation_rate` must lie in [0, 1].
    InvalidMutationRate(f64),
    /// The sample matrix has no rows or no columns.
    EmptySamples,
    /// Sample values must be finite.
    NonFiniteSample { row: usize, col: usize },
    /// `values.len()` does not equal `rows * cols`, or rows differ in length.
    ShapeMismatch { expected: usize, actual: usize },
    /// `rows * cols` does not fit in memory.
    ShapeTooLarge { rows: usize, cols: usize },
    /// A class label is outside `0..num_classes`.
    LabelOutOfRange { sample: usize, label: usize, num_classes: usize },
    /// A one-hot tensor where some sample is not in exactly one fold.
    NotOneHot { sample: usize },
    /// Candidate and sample matrix disagree on the number of samples.
    SampleCountMismatch { candidate: usize, samples: usize },
}

impl fmt::Display for StratifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroParameter(name) => write!(f, "{name} must be positive"),
            Self::TooManyFolds(k) => {
                write!(f, "num_folds = {k} exceeds the maximum of {}", u16::MAX)
            }
            Self::InvalidPenalty(p) => {
                write!(f, "fitness_penalty must be finite and > 0, got {p}")
            }
            Self::InvalidMutationRate(r) => {
                write!(f, "mutation_rate must be within [0, 1], got {r}")
            }
            Self::EmptySamples => write!(f, "sample matrix must have at least one row and column"),
            Self::NonFiniteSample { row, col } => {
                write!(f, "sample value at row {row}, column {col} is not finite")
            }
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "expected {expected} values, got {actual}")
            }
            Self::ShapeTooLarge { rows, cols } => {
                write!(f, "a {rows} x {cols} sample matrix is too large")
            }
            Self::LabelOutOfRange {
                sample,
                label,
                num_classes,
            } => write!(
                f,
                "sample {sample} has label {label}, outside 0..{num_classes}"
            ),
            Self::NotOneHot { sample } => {
                write!(f, "sample {sample} is not assigned to exactly one fold")
            }
            Self::SampleCountMismatch { candidate, samples } => write!(
                f,
                "candidate covers {candidate} samples but the matrix has {samples}"
            ),
        }
    }
}

impl std::error::Error for StratifyError {}
