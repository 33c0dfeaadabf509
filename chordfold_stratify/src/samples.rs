// Sample matrix: the weighting source for fitness evaluation.
//
// N rows (one per sample) by D columns (one per class, or per feature when a
// caller wants to balance something richer than labels). The optimizer never
// interprets the values; `fitness.rs` only sums rows into per-fold totals.
// Stored row-major in one `Vec<f64>` so the contraction walks memory in
// sample order.
//
// The usual case is label stratification, built with `from_labels` (class
// indices) or `from_named_labels` (string labels, as read by the `stratify`
// binary).

use crate::error::StratifyError;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    /// Build from row-major values. Rejects empty shapes, wrong lengths and
    /// non-finite entries.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, StratifyError> {
        if rows == 0 || cols == 0 {
            return Err(StratifyError::EmptySamples);
        }
        let len = checked_len(rows, cols)?;
        if values.len() != len {
            return Err(StratifyError::ShapeMismatch {
                expected: len,
                actual: values.len(),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(StratifyError::NonFiniteSample {
                row: pos / cols,
                col: pos % cols,
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Build from nested rows, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, StratifyError> {
        let n = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(n * cols);
        for row in rows {
            if row.len() != cols {
                return Err(StratifyError::ShapeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            values.extend(row);
        }
        Self::new(n, cols, values)
    }

    /// One-hot class indicator rows: sample `n` gets 1.0 in column `labels[n]`.
    pub fn from_labels(labels: &[usize], num_classes: usize) -> Result<Self, StratifyError> {
        let mut values = vec![0.0; checked_len(labels.len(), num_classes)?];
        for (sample, &label) in labels.iter().enumerate() {
            if label >= num_classes {
                return Err(StratifyError::LabelOutOfRange {
                    sample,
                    label,
                    num_classes,
                });
            }
            values[sample * num_classes + label] = 1.0;
        }
        Self::new(labels.len(), num_classes, values)
    }

    /// Like `from_labels`, but for string labels. Class columns follow the
    /// sorted order of the distinct labels, which is also returned.
    pub fn from_named_labels<S: AsRef<str>>(
        labels: &[S],
    ) -> Result<(Self, Vec<String>), StratifyError> {
        let mut classes: BTreeMap<&str, usize> = BTreeMap::new();
        for label in labels {
            classes.insert(label.as_ref(), 0);
        }
        for (idx, slot) in classes.values_mut().enumerate() {
            *slot = idx;
        }
        let indices: Vec<usize> = labels.iter().map(|l| classes[l.as_ref()]).collect();
        let names = classes.keys().map(|s| s.to_string()).collect();
        let matrix = Self::from_labels(&indices, classes.len())?;
        Ok((matrix, names))
    }

    /// Number of samples (N).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Output dimension (D).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Weights of one sample, one entry per column.
    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.cols;
        &self.values[start..start + self.cols]
    }

    /// Per-column totals over all samples.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for sample in 0..self.rows {
            for (sum, v) in sums.iter_mut().zip(self.row(sample)) {
                *sum += v;
            }
        }
        sums
    }
}

/// Element count of a `rows x cols` matrix, if one can be allocated.
fn checked_len(rows: usize, cols: usize) -> Result<usize, StratifyError> {
    rows.checked_mul(cols)
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f64>())
        .ok_or(StratifyError::ShapeTooLarge { rows, cols })
}
