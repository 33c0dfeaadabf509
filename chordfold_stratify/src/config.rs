// Tunable parameters for a stratification run.
//
// `StratifyConfig` mirrors the call surface `stratify(X, pop_size, n_iter,
// num_folds, fitness_penalty, mutation_rate, verbose)` and adds the seed and
// the rayon threshold. It loads from JSON with every field optional, so a
// config file only needs to name what it overrides:
//
//     { "pop_size": 100, "num_folds": 10, "seed": 2014 }
//
// `validate()` is the single gate for precondition errors; `evolve::stratify`
// calls it before touching the generator.

use crate::error::StratifyError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratifyConfig {
    /// Candidates per generation. Constant for the whole run.
    pub pop_size: usize,
    /// Generation budget. The run stops once the generation counter passes it.
    pub n_iter: usize,
    /// Number of folds (K).
    pub num_folds: usize,
    /// Selection pressure. Higher values let the best candidates dominate
    /// reproduction.
    pub fitness_penalty: f64,
    /// Per-sample probability that a child's gene is moved to another fold.
    pub mutation_rate: f64,
    /// Report every improvement of the best fitness on stderr.
    pub verbose: bool,
    /// Seed for the CLI's generator. Library callers pass their own `FoldRng`.
    pub seed: Option<u64>,
    /// Populations at least this large are scored in parallel.
    pub parallel_threshold: usize,
}

impl Default for StratifyConfig {
    fn default() -> Self {
        StratifyConfig {
            pop_size: 50,
            n_iter: 500,
            num_folds: 5,
            fitness_penalty: 4.0,
            mutation_rate: 0.005,
            verbose: false,
            seed: None,
            parallel_threshold: 256,
        }
    }
}

impl StratifyConfig {
    /// Parse a config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject parameter combinations the optimizer cannot run with.
    pub fn validate(&self) -> Result<(), StratifyError> {
        if self.pop_size == 0 {
            return Err(StratifyError::ZeroParameter("pop_size"));
        }
        if self.n_iter == 0 {
            return Err(StratifyError::ZeroParameter("n_iter"));
        }
        if self.num_folds == 0 {
            return Err(StratifyError::ZeroParameter("num_folds"));
        }
        if self.num_folds > u16::MAX as usize {
            return Err(StratifyError::TooManyFolds(self.num_folds));
        }
        if !self.fitness_penalty.is_finite() || self.fitness_penalty <= 0.0 {
            return Err(StratifyError::InvalidPenalty(self.fitness_penalty));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(StratifyError::InvalidMutationRate(self.mutation_rate));
        }
        Ok(())
    }
}
