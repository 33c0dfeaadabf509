// Parent selection: fitness vector -> sampling distribution -> parent pairs.
//
// Fitness is rescaled into [0, 1] (best = 0, worst = 1). A collapsed range
// means every individual scored the same; `SelectionWeights::from_fitness`
// returns `None` and the controller treats that as convergence. Otherwise
// the selection pmf is `softmax(-fitness_penalty * rescaled)`, so a larger
// penalty concentrates reproduction on the best individuals.
//
// Draws use a CDF with a leading zero (`pop_size + 1` entries). A uniform U
// selects the first position whose CDF value exceeds U, minus one for the
// leading zero. The second parent of each pair is drawn from the same
// distribution with the first parent's mass removed.

use chordfold_prng::FoldRng;

/// Selection distribution for one generation.
#[derive(Clone, Debug)]
pub struct SelectionWeights {
    pmf: Vec<f64>,
    cdf: Vec<f64>,
}

impl SelectionWeights {
    /// Build the distribution, or `None` when the fitness range is degenerate.
    pub fn from_fitness(fitness: &[f64], fitness_penalty: f64) -> Option<Self> {
        let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let max = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let scale = max - min;
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        let logits: Vec<f64> = fitness
            .iter()
            .map(|f| -fitness_penalty * (f - min) / scale)
            .collect();
        let pmf = softmax(&logits);

        let mut cdf = Vec::with_capacity(pmf.len() + 1);
        let mut acc = 0.0;
        cdf.push(acc);
        for p in &pmf {
            acc += p;
            cdf.push(acc);
        }
        Some(Self { pmf, cdf })
    }

    /// Selection probability of each individual.
    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }

    /// Cumulative distribution with the leading zero.
    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    /// True for an empty population.
    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }

    /// Index of the individual whose CDF interval contains `u`.
    pub fn index_for(&self, u: f64) -> usize {
        // First CDF entry strictly above u; entry 0 is the leading zero and
        // u >= 0, so the position is at least 1. Rounding can leave the last
        // entry a hair below 1.0, in which case the last individual wins.
        let pos = self.cdf.partition_point(|&c| c <= u);
        pos.clamp(1, self.pmf.len()) - 1
    }

    /// One parent index drawn from the selection pmf.
    pub fn draw(&self, rng: &mut FoldRng) -> usize {
        self.index_for(rng.next_f64())
    }

    /// Two distinct parent indices. Requires at least two individuals.
    ///
    /// The second index follows the pmf conditioned on differing from the
    /// first: a single uniform over the remaining mass is mapped back onto the
    /// CDF with the first parent's interval skipped.
    pub fn draw_pair(&self, rng: &mut FoldRng) -> (usize, usize) {
        let first = self.draw(rng);
        let n = self.pmf.len();
        let before = self.cdf[first];
        let rest = self.cdf[n] - self.pmf[first];
        if !rest.is_finite() || rest <= 0.0 {
            // Every other individual underflowed to zero weight.
            let other = rng.index(n - 1);
            let second = if other >= first { other + 1 } else { other };
            return (first, second);
        }

        let u = rng.next_f64() * rest;
        let target = if u < before { u } else { u + self.pmf[first] };
        let mut second = self.index_for(target);
        if second == first {
            // Rounding at the edge of the skipped interval.
            second = if first + 1 < n { first + 1 } else { first - 1 };
        }
        (first, second)
    }

    /// One parent pair per child of the next generation.
    pub fn draw_pairs(&self, count: usize, rng: &mut FoldRng) -> Vec<(usize, usize)> {
        (0..count).map(|_| self.draw_pair(rng)).collect()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
