// Reproduction operators: uniform crossover and per-sample mutation.
//
// Crossover draws an independent fair coin per sample. The child starts as
// a copy of parent 1 and takes parent 2's fold wherever the coin came up
// heads, so every gene of the child comes from one of its parents.
//
// Mutation runs on the finished child, before it joins the population:
// each sample independently moves, with probability `mutation_rate`, to a
// uniformly chosen fold other than its current one. A rate of 0.0 draws
// nothing from the generator, leaving the run identical to pure crossover.

use crate::candidate::Candidate;
use crate::error::StratifyError;
use chordfold_prng::FoldRng;

/// Build a child from two same-shaped parents.
pub fn crossover(
    parent1: &Candidate,
    parent2: &Candidate,
    rng: &mut FoldRng,
) -> Result<Candidate, StratifyError> {
    if parent1.num_samples() != parent2.num_samples() {
        return Err(StratifyError::SampleCountMismatch {
            candidate: parent2.num_samples(),
            samples: parent1.num_samples(),
        });
    }
    if parent1.num_folds() != parent2.num_folds() {
        return Err(StratifyError::ShapeMismatch {
            expected: parent1.num_folds(),
            actual: parent2.num_folds(),
        });
    }

    let mut child = parent1.clone();
    for (gene, &donor) in child.folds_mut().iter_mut().zip(parent2.folds()) {
        if rng.coin_flip() {
            *gene = donor;
        }
    }
    Ok(child)
}

/// Reassign each sample to a different random fold with probability
/// `mutation_rate`. Single-fold candidates have nowhere to move.
pub fn mutate(mut child: Candidate, mutation_rate: f64, rng: &mut FoldRng) -> Candidate {
    let num_folds = child.num_folds();
    if mutation_rate <= 0.0 || num_folds < 2 {
        return child;
    }
    for gene in child.folds_mut() {
        if rng.random_bool(mutation_rate) {
            // Skip over the current fold so the draw always lands elsewhere.
            let pick = rng.index(num_folds - 1) as u16;
            *gene = if pick >= *gene { pick + 1 } else { pick };
        }
    }
    child
}
