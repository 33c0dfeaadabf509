// Stratified K-fold assignment by genetic search.
//
// Partitions a dataset's samples into K folds so that every class (or
// feature column) is spread as evenly as possible across the folds, for
// building cross-validation splits of the chord-recognition datasets. The
// search is a generational genetic algorithm over fold assignments.
//
// Architecture:
// - candidate.rs: `Candidate`, one fold per sample (the one-hot (K, 1, N)
//   tensor by construction), plus random initialization
// - samples.rs: `SampleMatrix`, the N×D weights the fitness sums per fold
// - fitness.rs: fold-mass contraction and the standard-deviation imbalance
//   score (lower is better)
// - selection.rs: rescaled softmax selection distribution and distinct
//   parent-pair draws
// - crossover.rs: uniform two-parent crossover and per-sample mutation
// - evolve.rs: `Evolution` generation loop, best record, termination, and
//   the `stratify` entry point
// - config.rs: `StratifyConfig`, JSON-loadable run parameters
// - error.rs: `StratifyError` precondition failures
//
// Every stochastic step takes an explicit `chordfold_prng::FoldRng`, so a
// run is reproducible from its seed.

pub mod candidate;
pub mod config;
pub mod crossover;
pub mod error;
pub mod evolve;
pub mod fitness;
pub mod samples;
pub mod selection;

pub use candidate::Candidate;
pub use chordfold_prng::FoldRng;
pub use config::StratifyConfig;
pub use error::StratifyError;
pub use evolve::{Evolution, Improvement, StratifyResult, Termination, stratify};
pub use samples::SampleMatrix;
