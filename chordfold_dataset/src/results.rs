// Aggregation of per-fold evaluation scores.
//
// Each fold's evaluation writes a JSON object of the form
//
//     { "class_labels": [...], "<stat>": { "<metric>": number, ... }, ... }
//
// `collapse_results` averages every (stat, metric) cell across folds and
// reports mean and population standard deviation, formatted for a LaTeX
// table. The `class_labels` entry is carried for reference by the scorer and
// is ignored here. All files must report the same stats and metrics.

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const IGNORED_KEY: &str = "class_labels";

/// One fold's scores: stat -> metric -> value.
pub type Scores = BTreeMap<String, BTreeMap<String, f64>>;

/// Averaged scores ready for printing or JSON output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Metric names, sorted.
    pub headers: Vec<String>,
    /// One row per stat: the stat name, then `mean±std` per metric.
    pub table: Vec<Vec<String>>,
}

/// Parse one score file.
pub fn load_scores(path: &Path) -> Result<Scores, DatasetError> {
    let text = std::fs::read_to_string(path)?;
    parse_scores(&text, path)
}

fn parse_scores(text: &str, path: &Path) -> Result<Scores, DatasetError> {
    let malformed = |reason: String| DatasetError::MalformedScores {
        path: path.to_path_buf(),
        reason,
    };
    let raw: BTreeMap<String, Value> = serde_json::from_str(text)?;
    let mut scores = Scores::new();
    for (stat, value) in raw {
        if stat == IGNORED_KEY {
            continue;
        }
        let Value::Object(metrics) = value else {
            return Err(malformed(format!("stat '{stat}' is not an object")));
        };
        let mut row = BTreeMap::new();
        for (metric, v) in metrics {
            let Some(x) = v.as_f64() else {
                return Err(malformed(format!("{stat}.{metric} is not a number")));
            };
            row.insert(metric, x);
        }
        scores.insert(stat, row);
    }
    Ok(scores)
}

/// Load and average a list of score files.
pub fn collapse_results<P: AsRef<Path>>(score_files: &[P]) -> Result<ResultTable, DatasetError> {
    let mut loaded = Vec::with_capacity(score_files.len());
    for path in score_files {
        let path = path.as_ref();
        loaded.push((path.to_path_buf(), load_scores(path)?));
    }
    collapse_scores(&loaded)
}

/// Average already-parsed scores. The first entry fixes the expected stats
/// and metrics; paths are only used for error messages.
pub fn collapse_scores(scores: &[(PathBuf, Scores)]) -> Result<ResultTable, DatasetError> {
    let Some((first_path, first)) = scores.first() else {
        return Err(DatasetError::NoScores);
    };
    let headers: Vec<String> = first
        .values()
        .next()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();

    for (stat, metrics) in first {
        if !metrics.keys().eq(headers.iter()) {
            return Err(DatasetError::MalformedScores {
                path: first_path.clone(),
                reason: format!("stat '{stat}' reports different metrics than the others"),
            });
        }
    }
    for (path, s) in &scores[1..] {
        if let Some(reason) = key_mismatch(first, s) {
            return Err(DatasetError::MalformedScores {
                path: path.clone(),
                reason,
            });
        }
    }

    let mut table = Vec::with_capacity(first.len());
    for stat in first.keys() {
        let mut row = vec![stat.clone()];
        for metric in &headers {
            let values: Vec<f64> = scores.iter().map(|(_, s)| s[stat][metric]).collect();
            let (mean, std) = mean_std(&values);
            row.push(format!("${mean:.3}\\pm{std:.3}$"));
        }
        table.push(row);
    }
    Ok(ResultTable { headers, table })
}

/// First stat or metric present in one of `expected`/`actual` but not the
/// other, as an error reason.
fn key_mismatch(expected: &Scores, actual: &Scores) -> Option<String> {
    let side = |a: &Scores, b: &Scores, what: &str| {
        for (stat, metrics) in a {
            let Some(other) = b.get(stat) else {
                return Some(format!("{what} stat '{stat}'"));
            };
            if let Some(metric) = metrics.keys().find(|m| !other.contains_key(*m)) {
                return Some(format!("{what} {stat}.{metric}"));
            }
        }
        None
    };
    side(expected, actual, "missing").or_else(|| side(actual, expected, "unexpected"))
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
