// Fitness evaluation: how unevenly a candidate spreads each class over folds.
//
// For candidate C and samples X the fold mass is the contraction
// `M[k][d] = sum over samples n in fold k of X[n][d]`, a K×D matrix. Each
// column is divided by its cross-fold total, so every class contributes a
// distribution over folds summing to 1. Fitness is the population standard
// deviation of all K×D normalized entries. A class spread perfectly evenly
// contributes 1/K everywhere; piling it into fewer folds pushes entries toward
// 0 and 1 and raises the deviation. Lower is better.
//
// A column with zero total mass (a class absent from the data, or a feature
// that is zero everywhere) is normalized by 1, leaving a column of zeros
// instead of NaN. The grouping is explicit over (fold, column), so nothing
// assumes N is a multiple of K or that D factors into fold-sized units.
//
// `evaluate_population` is called once per generation by `evolve.rs`.

use crate::candidate::Candidate;
use crate::error::StratifyError;
use crate::samples::SampleMatrix;
use rayon::prelude::*;

/// Per-fold column totals, flattened fold-major (`mass[k * cols + d]`).
pub fn fold_mass(candidate: &Candidate, samples: &SampleMatrix) -> Result<Vec<f64>, StratifyError> {
    if candidate.num_samples() != samples.rows() {
        return Err(StratifyError::SampleCountMismatch {
            candidate: candidate.num_samples(),
            samples: samples.rows(),
        });
    }
    let cols = samples.cols();
    let mut mass = vec![0.0; candidate.num_folds() * cols];
    for (sample, &fold) in candidate.folds().iter().enumerate() {
        let base = fold as usize * cols;
        for (slot, v) in mass[base..base + cols].iter_mut().zip(samples.row(sample)) {
            *slot += v;
        }
    }
    Ok(mass)
}

/// Imbalance score of one candidate. Lower is more balanced.
pub fn fitness(candidate: &Candidate, samples: &SampleMatrix) -> Result<f64, StratifyError> {
    let mut mass = fold_mass(candidate, samples)?;
    let cols = samples.cols();

    let mut norm = vec![0.0; cols];
    for row in mass.chunks_exact(cols) {
        for (n, v) in norm.iter_mut().zip(row) {
            *n += v;
        }
    }
    for n in &mut norm {
        if *n == 0.0 {
            *n = 1.0;
        }
    }
    for row in mass.chunks_exact_mut(cols) {
        for (v, n) in row.iter_mut().zip(&norm) {
            *v /= n;
        }
    }

    Ok(std_dev(&mass))
}

/// Fitness of every candidate, in population order. Populations at or above
/// `parallel_threshold` are scored on the rayon pool; the output is the same
/// either way.
pub fn evaluate_population(
    population: &[Candidate],
    samples: &SampleMatrix,
    parallel_threshold: usize,
) -> Result<Vec<f64>, StratifyError> {
    if population.len() >= parallel_threshold {
        population
            .par_iter()
            .map(|c| fitness(c, samples))
            .collect()
    } else {
        population.iter().map(|c| fitness(c, samples)).collect()
    }
}

/// Population (ddof = 0) standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordfold_prng::FoldRng;

    /// 4 classes × 5 samples, sample n has class n / 5.
    fn four_by_five() -> SampleMatrix {
        let labels: Vec<usize> = (0..20).map(|n| n / 5).collect();
        SampleMatrix::from_labels(&labels, 4).unwrap()
    }

    #[test]
    fn fold_mass_counts_classes_per_fold() {
        let samples = SampleMatrix::from_labels(&[0, 1, 1, 0, 1], 2).unwrap();
        let c = Candidate::from_folds(vec![0, 0, 1, 1, 1], 2).unwrap();
        let mass = fold_mass(&c, &samples).unwrap();
        // fold 0: one of class 0, one of class 1; fold 1: one and two.
        assert_eq!(mass, vec![1.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn perfect_balance_scores_zero() {
        // Every fold gets exactly one sample of every class.
        let folds: Vec<u16> = (0..20).map(|n| (n % 5) as u16).collect();
        let c = Candidate::from_folds(folds, 5).unwrap();
        let f = fitness(&c, &four_by_five()).unwrap();
        assert!(f.abs() < 1e-12, "balanced fitness {f}");
    }

    #[test]
    fn concentration_scores_worse_than_balance() {
        let samples = four_by_five();
        let balanced = Candidate::from_folds((0..20).map(|n| (n % 5) as u16).collect(), 5).unwrap();
        // Each class entirely inside one fold.
        let piled = Candidate::from_folds((0..20).map(|n| (n / 5) as u16).collect(), 5).unwrap();
        let fb = fitness(&balanced, &samples).unwrap();
        let fp = fitness(&piled, &samples).unwrap();
        assert!(fb < fp, "balanced {fb} should beat piled {fp}");
    }

    #[test]
    fn imbalance_is_monotone_in_concentration() {
        let samples = SampleMatrix::from_labels(&[0; 10], 1).unwrap();
        // 5/5, then 7/3, then 10/0 across two folds.
        let even = Candidate::from_folds(vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1], 2).unwrap();
        let skew = Candidate::from_folds(vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1], 2).unwrap();
        let all = Candidate::from_folds(vec![0; 10], 2).unwrap();
        let fe = fitness(&even, &samples).unwrap();
        let fs = fitness(&skew, &samples).unwrap();
        let fa = fitness(&all, &samples).unwrap();
        assert!(fe < fs && fs < fa, "{fe} < {fs} < {fa}");
        assert!((fa - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_column_stays_finite() {
        // Column 2 never fires.
        let samples = SampleMatrix::from_rows(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ])
        .unwrap();
        let c = Candidate::from_folds(vec![0, 0, 1, 1], 2).unwrap();
        let mass = fold_mass(&c, &samples).unwrap();
        assert_eq!(mass[2], 0.0);
        let f = fitness(&c, &samples).unwrap();
        assert!(f.is_finite());
    }

    #[test]
    fn uneven_sample_count_needs_no_reshape() {
        // 7 samples into 3 folds: N is not a multiple of K.
        let samples = SampleMatrix::from_labels(&[0, 1, 0, 1, 0, 1, 0], 2).unwrap();
        let c = Candidate::from_folds(vec![0, 1, 2, 0, 1, 2, 0], 3).unwrap();
        let f = fitness(&c, &samples).unwrap();
        assert!(f.is_finite() && f >= 0.0);
    }

    #[test]
    fn mismatched_sizes_are_errors() {
        let samples = SampleMatrix::from_labels(&[0, 1, 0], 2).unwrap();
        let c = Candidate::from_folds(vec![0, 1], 2).unwrap();
        assert_eq!(
            fitness(&c, &samples).unwrap_err(),
            StratifyError::SampleCountMismatch {
                candidate: 2,
                samples: 3
            }
        );
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let samples = four_by_five();
        let mut rng = FoldRng::new(21);
        let population: Vec<Candidate> = (0..32)
            .map(|_| Candidate::random(20, 5, &mut rng).unwrap())
            .collect();
        let seq = evaluate_population(&population, &samples, usize::MAX).unwrap();
        let par = evaluate_population(&population, &samples, 1).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 32);
    }
}
