// Evolution controller: owns the population and drives generations.
//
// One `step` is one generation:
//
//   1. Score the whole population (`fitness::evaluate_population`).
//   2. If the best member beats the best record, replace the record. The
//      record is a clone held outside the population, so it survives the
//      wholesale replacement in step 5.
//   3. Build the selection distribution. A collapsed fitness range means
//      every member scored the same; stop: Converged.
//   4. If the generation counter has passed `n_iter`, stop: BudgetExhausted.
//   5. Draw `pop_size` parent pairs, cross each pair into one child, mutate
//      the child, and replace the population with the children. Advance
//      the generation counter.
//
// Because step 4 follows the evaluation, the last bred population is always
// scored before the run ends. The best record is monotonically
// non-increasing, and the population size never changes.
//
// All randomness comes from the caller's `FoldRng`; the same seed, samples
// and config reproduce the same result.

use crate::candidate::Candidate;
use crate::config::StratifyConfig;
use crate::crossover::{crossover, mutate};
use crate::error::StratifyError;
use crate::fitness::evaluate_population;
use crate::samples::SampleMatrix;
use crate::selection::SelectionWeights;
use chordfold_prng::FoldRng;

/// Why a run stopped. Both are normal outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every candidate in the population scored the same fitness.
    Converged,
    /// The generation counter passed `n_iter`.
    BudgetExhausted,
}

/// A new best fitness, found in `generation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Improvement {
    pub generation: usize,
    pub fitness: f64,
}

/// Outcome of a finished run.
#[derive(Clone, Debug)]
pub struct StratifyResult {
    /// Best assignment seen at any generation.
    pub best: Candidate,
    pub best_fitness: f64,
    /// Generations bred before stopping.
    pub generations: usize,
    pub termination: Termination,
    /// Mean fitness of the initial random population.
    pub initial_mean_fitness: f64,
    /// Every improvement of the best record, oldest first.
    pub history: Vec<Improvement>,
}

/// A stratification run in progress, advanced one generation per `step`.
pub struct Evolution<'a> {
    samples: &'a SampleMatrix,
    config: &'a StratifyConfig,
    population: Vec<Candidate>,
    generation: usize,
    best: Option<(Candidate, f64)>,
    initial_mean_fitness: Option<f64>,
    history: Vec<Improvement>,
}

impl<'a> Evolution<'a> {
    /// Validate the config and draw `pop_size` random candidates.
    pub fn new(
        samples: &'a SampleMatrix,
        config: &'a StratifyConfig,
        rng: &mut FoldRng,
    ) -> Result<Self, StratifyError> {
        config.validate()?;
        let population = (0..config.pop_size)
            .map(|_| Candidate::random(samples.rows(), config.num_folds, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(samples, config, population))
    }

    /// Start from a caller-supplied population instead of random draws.
    pub fn with_population(
        samples: &'a SampleMatrix,
        config: &'a StratifyConfig,
        population: Vec<Candidate>,
    ) -> Result<Self, StratifyError> {
        config.validate()?;
        if population.len() != config.pop_size {
            return Err(StratifyError::ShapeMismatch {
                expected: config.pop_size,
                actual: population.len(),
            });
        }
        for candidate in &population {
            if candidate.num_samples() != samples.rows() {
                return Err(StratifyError::SampleCountMismatch {
                    candidate: candidate.num_samples(),
                    samples: samples.rows(),
                });
            }
            if candidate.num_folds() != config.num_folds {
                return Err(StratifyError::ShapeMismatch {
                    expected: config.num_folds,
                    actual: candidate.num_folds(),
                });
            }
        }
        Ok(Self::from_parts(samples, config, population))
    }

    fn from_parts(
        samples: &'a SampleMatrix,
        config: &'a StratifyConfig,
        population: Vec<Candidate>,
    ) -> Self {
        Evolution {
            samples,
            config,
            population,
            generation: 0,
            best: None,
            initial_mean_fitness: None,
            history: Vec::new(),
        }
    }

    /// The current generation's candidates, in breeding order.
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// Generations bred so far; 0 until the first `step` breeds.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best fitness so far, or infinity before the first evaluation.
    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, f)| *f)
    }

    /// Best candidate so far, `None` before the first evaluation.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref().map(|(c, _)| c)
    }

    /// Run one generation. Returns `Some` once the run is over.
    pub fn step(&mut self, rng: &mut FoldRng) -> Result<Option<Termination>, StratifyError> {
        let fitness =
            evaluate_population(&self.population, self.samples, self.config.parallel_threshold)?;

        if self.initial_mean_fitness.is_none() {
            self.initial_mean_fitness = Some(fitness.iter().sum::<f64>() / fitness.len() as f64);
        }

        let (best_idx, best_fit) = fitness
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (i, f)| if f < acc.1 { (i, f) } else { acc });
        if best_fit < self.best_fitness() {
            self.best = Some((self.population[best_idx].clone(), best_fit));
            self.history.push(Improvement {
                generation: self.generation,
                fitness: best_fit,
            });
            if self.config.verbose {
                eprintln!("{:6}\tNew best: {:.5}", self.generation, best_fit);
            }
        }

        let Some(weights) = SelectionWeights::from_fitness(&fitness, self.config.fitness_penalty)
        else {
            return Ok(Some(Termination::Converged));
        };
        if self.generation > self.config.n_iter {
            return Ok(Some(Termination::BudgetExhausted));
        }

        let pairs = weights.draw_pairs(self.config.pop_size, rng);
        let mut children = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            let child = crossover(&self.population[a], &self.population[b], rng)?;
            children.push(mutate(child, self.config.mutation_rate, rng));
        }
        self.population = children;
        self.generation += 1;
        Ok(None)
    }

    /// Step until the run terminates.
    pub fn run(mut self, rng: &mut FoldRng) -> Result<StratifyResult, StratifyError> {
        loop {
            if let Some(termination) = self.step(rng)? {
                return self.into_result(termination);
            }
        }
    }

    fn into_result(self, termination: Termination) -> Result<StratifyResult, StratifyError> {
        // Finite samples give finite fitness, so the first evaluation always
        // sets a record; only an empty population could leave it unset.
        let (best, best_fitness) = self.best.ok_or(StratifyError::EmptySamples)?;
        Ok(StratifyResult {
            best,
            best_fitness,
            generations: self.generation,
            termination,
            initial_mean_fitness: self.initial_mean_fitness.unwrap_or(f64::INFINITY),
            history: self.history,
        })
    }
}

/// Search for the most class-balanced assignment of `samples` into
/// `config.num_folds` folds.
pub fn stratify(
    samples: &SampleMatrix,
    config: &StratifyConfig,
    rng: &mut FoldRng,
) -> Result<StratifyResult, StratifyError> {
    Evolution::new(samples, config, rng)?.run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::fitness;

    fn labels(per_class: usize, classes: usize) -> SampleMatrix {
        let labels: Vec<usize> = (0..per_class * classes).map(|n| n / per_class).collect();
        SampleMatrix::from_labels(&labels, classes).unwrap()
    }

    fn small_config() -> StratifyConfig {
        StratifyConfig {
            pop_size: 10,
            n_iter: 30,
            ..Default::default()
        }
    }

    #[test]
    fn best_record_never_worsens() {
        let samples = labels(6, 3);
        let config = small_config();
        let mut rng = FoldRng::new(17);
        let mut evo = Evolution::new(&samples, &config, &mut rng).unwrap();
        let mut last = f64::INFINITY;
        loop {
            let done = evo.step(&mut rng).unwrap();
            assert!(evo.best_fitness() <= last);
            last = evo.best_fitness();
            if done.is_some() {
                break;
            }
        }
    }

    #[test]
    fn population_size_and_one_hot_hold_every_generation() {
        let samples = labels(5, 4);
        let config = StratifyConfig {
            mutation_rate: 0.05,
            ..small_config()
        };
        let mut rng = FoldRng::new(3);
        let mut evo = Evolution::new(&samples, &config, &mut rng).unwrap();
        loop {
            assert_eq!(evo.population().len(), config.pop_size);
            for candidate in evo.population() {
                assert_eq!(candidate.num_folds(), 5);
                for column in 0..samples.rows() {
                    let hot: f64 = candidate.to_one_hot().iter().map(|r| r[column]).sum();
                    assert_eq!(hot, 1.0);
                }
            }
            if evo.step(&mut rng).unwrap().is_some() {
                break;
            }
        }
    }

    #[test]
    fn identical_population_converges_immediately() {
        let samples = labels(5, 4);
        let config = small_config();
        let mut rng = FoldRng::new(1);
        let clone = Candidate::random(20, 5, &mut rng).unwrap();
        let population = vec![clone.clone(); config.pop_size];
        let result = Evolution::with_population(&samples, &config, population)
            .unwrap()
            .run(&mut rng)
            .unwrap();
        assert_eq!(result.termination, Termination::Converged);
        assert_eq!(result.generations, 0);
        assert_eq!(result.best, clone);
    }

    #[test]
    fn convergence_on_the_last_generation_is_not_reported_as_budget() {
        let samples = labels(5, 4);
        let config = small_config();
        let mut rng = FoldRng::new(4);
        let clone = Candidate::random(20, 5, &mut rng).unwrap();
        let mut evo =
            Evolution::with_population(&samples, &config, vec![clone; config.pop_size]).unwrap();
        evo.generation = config.n_iter + 1;
        assert_eq!(evo.step(&mut rng).unwrap(), Some(Termination::Converged));
    }

    #[test]
    fn single_member_population_converges() {
        let samples = labels(3, 2);
        let config = StratifyConfig {
            pop_size: 1,
            ..small_config()
        };
        let result = stratify(&samples, &config, &mut FoldRng::new(5)).unwrap();
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn budget_bounds_generations() {
        let samples = labels(10, 5);
        let config = StratifyConfig {
            pop_size: 12,
            n_iter: 4,
            ..Default::default()
        };
        let result = stratify(&samples, &config, &mut FoldRng::new(9)).unwrap();
        assert!(result.generations <= config.n_iter + 1);
        if result.termination == Termination::BudgetExhausted {
            assert_eq!(result.generations, config.n_iter + 1);
        }
    }

    #[test]
    fn reported_fitness_matches_best_candidate() {
        let samples = labels(4, 3);
        let result = stratify(&samples, &small_config(), &mut FoldRng::new(23)).unwrap();
        let rescored = fitness(&result.best, &samples).unwrap();
        assert_eq!(rescored, result.best_fitness);
        let last = result.history.last().unwrap();
        assert_eq!(last.fitness, result.best_fitness);
        assert!(result.history.windows(2).all(|w| w[1].fitness < w[0].fitness));
        assert_eq!(result.history[0].generation, 0);
    }

    #[test]
    fn same_seed_reproduces_run() {
        let samples = labels(5, 4);
        let config = small_config();
        let a = stratify(&samples, &config, &mut FoldRng::new(44)).unwrap();
        let b = stratify(&samples, &config, &mut FoldRng::new(44)).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.generations, b.generations);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let samples = labels(2, 2);
        let config = StratifyConfig {
            n_iter: 0,
            ..Default::default()
        };
        assert_eq!(
            stratify(&samples, &config, &mut FoldRng::new(0)).unwrap_err(),
            StratifyError::ZeroParameter("n_iter")
        );
    }

    #[test]
    fn supplied_population_must_fit_config() {
        let samples = labels(2, 2);
        let config = StratifyConfig {
            pop_size: 2,
            ..Default::default()
        };
        let mut rng = FoldRng::new(0);
        let wrong_size = vec![Candidate::random(4, 5, &mut rng).unwrap()];
        assert!(Evolution::with_population(&samples, &config, wrong_size).is_err());
        let wrong_folds = vec![Candidate::random(4, 3, &mut rng).unwrap(); 2];
        assert!(Evolution::with_population(&samples, &config, wrong_folds).is_err());
        let wrong_samples = vec![Candidate::random(5, 5, &mut rng).unwrap(); 2];
        assert!(Evolution::with_population(&samples, &config, wrong_samples).is_err());
    }
}
