// Candidate fold assignments (the assignment encoder).
//
// Conceptually a candidate is a (K, 1, N) one-hot tensor: for each of the N
// samples exactly one of the K fold slots holds 1.0. Storing that tensor
// densely would let crossover or mutation break the one-hot invariant, so a
// `Candidate` keeps one fold index per sample instead. Every value it can
// represent is a valid one-hot tensor; `to_one_hot` / `from_one_hot` convert
// at the boundary for callers that want the tensor form.
//
// Candidates are never mutated in place by the optimizer. `crossover.rs`
// builds children as new values and `evolve.rs` drops the old population
// wholesale each generation, keeping only its out-of-band best record.

use crate::error::StratifyError;
use chordfold_prng::FoldRng;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    num_folds: usize,
    folds: Vec<u16>,
}

impl Candidate {
    /// Assign each of `num_samples` samples to a uniformly random fold.
    pub fn random(
        num_samples: usize,
        num_folds: usize,
        rng: &mut FoldRng,
    ) -> Result<Self, StratifyError> {
        check_shape(num_samples, num_folds)?;
        let folds = (0..num_samples)
            .map(|_| rng.index(num_folds) as u16)
            .collect();
        Ok(Self { num_folds, folds })
    }

    /// Wrap an explicit per-sample fold list.
    pub fn from_folds(folds: Vec<u16>, num_folds: usize) -> Result<Self, StratifyError> {
        check_shape(folds.len(), num_folds)?;
        if let Some(sample) = folds.iter().position(|&k| k as usize >= num_folds) {
            return Err(StratifyError::NotOneHot { sample });
        }
        Ok(Self { num_folds, folds })
    }

    /// Rebuild from a K×N tensor (`tensor[k][n]`). Every column must hold a
    /// single 1.0 and zeros elsewhere.
    pub fn from_one_hot(tensor: &[Vec<f64>]) -> Result<Self, StratifyError> {
        let num_folds = tensor.len();
        let num_samples = tensor.first().map_or(0, Vec::len);
        check_shape(num_samples, num_folds)?;
        if let Some(bad) = tensor.iter().find(|row| row.len() != num_samples) {
            return Err(StratifyError::ShapeMismatch {
                expected: num_samples,
                actual: bad.len(),
            });
        }
        let mut folds = Vec::with_capacity(num_samples);
        for sample in 0..num_samples {
            let mut hot = None;
            for (fold, row) in tensor.iter().enumerate() {
                match row[sample] {
                    v if v == 0.0 => {}
                    v if v == 1.0 && hot.is_none() => hot = Some(fold as u16),
                    _ => return Err(StratifyError::NotOneHot { sample }),
                }
            }
            folds.push(hot.ok_or(StratifyError::NotOneHot { sample })?);
        }
        Ok(Self { num_folds, folds })
    }

    /// The K×N one-hot tensor (`result[k][n]`).
    pub fn to_one_hot(&self) -> Vec<Vec<f64>> {
        let mut tensor = vec![vec![0.0; self.folds.len()]; self.num_folds];
        for (sample, &fold) in self.folds.iter().enumerate() {
            tensor[fold as usize][sample] = 1.0;
        }
        tensor
    }

    /// Number of folds (K).
    pub fn num_folds(&self) -> usize {
        self.num_folds
    }

    /// Number of samples (N).
    pub fn num_samples(&self) -> usize {
        self.folds.len()
    }

    /// Fold holding `sample`. Panics if `sample` is out of range.
    pub fn fold_of(&self, sample: usize) -> usize {
        self.folds[sample] as usize
    }

    /// Per-sample fold indices.
    pub fn folds(&self) -> &[u16] {
        &self.folds
    }

    pub(crate) fn folds_mut(&mut self) -> &mut [u16] {
        &mut self.folds
    }

    /// Number of samples placed in each fold.
    pub fn fold_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_folds];
        for &fold in &self.folds {
            sizes[fold as usize] += 1;
        }
        sizes
    }

    /// Sample indices assigned to `fold`, ascending.
    pub fn samples_in_fold(&self, fold: usize) -> Vec<usize> {
        self.folds
            .iter()
            .enumerate()
            .filter(|&(_, &k)| k as usize == fold)
            .map(|(n, _)| n)
            .collect()
    }

    /// Pair sample keys (in sample order) with their folds. This is the fold
    /// map that split partitioning consumes.
    pub fn fold_map<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<BTreeMap<String, usize>, StratifyError> {
        if keys.len() != self.folds.len() {
            return Err(StratifyError::SampleCountMismatch {
                candidate: self.folds.len(),
                samples: keys.len(),
            });
        }
        Ok(keys
            .iter()
            .zip(&self.folds)
            .map(|(key, &fold)| (key.as_ref().to_string(), fold as usize))
            .collect())
    }
}

fn check_shape(num_samples: usize, num_folds: usize) -> Result<(), StratifyError> {
    if num_samples == 0 {
        return Err(StratifyError::EmptySamples);
    }
    if num_folds == 0 {
        return Err(StratifyError::ZeroParameter("num_folds"));
    }
    if num_folds > u16::MAX as usize {
        return Err(StratifyError::TooManyFolds(num_folds));
    }
    Ok(())
}
