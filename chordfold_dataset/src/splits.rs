// Train/valid/test partitioning of a fold map.
//
// A fold map (`key -> fold index`) comes from `chordfold_stratify`'s
// `Candidate::fold_map`. A split names which folds feed training, validation
// and testing; each key lands in the first of train, valid, test whose fold
// set contains its fold, and is left out if none does. Overlapping fold sets
// are therefore resolved in favor of training.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys per partition, in the fold map's key order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splits {
    pub train: Vec<String>,
    pub valid: Vec<String>,
    pub test: Vec<String>,
}

/// Partition the keys of `fold_map` by the fold lists. A key whose fold
/// appears in more than one list goes to the first of train, valid, test.
pub fn split_folds(
    fold_map: &BTreeMap<String, usize>,
    train: &[usize],
    valid: &[usize],
    test: &[usize],
) -> Splits {
    let mut splits = Splits::default();
    for (key, fold) in fold_map {
        let target = if train.contains(fold) {
            &mut splits.train
        } else if valid.contains(fold) {
            &mut splits.valid
        } else if test.contains(fold) {
            &mut splits.test
        } else {
            continue;
        };
        target.push(key.clone());
    }
    splits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold_map() -> BTreeMap<String, usize> {
        [("a", 0), ("b", 1), ("c", 2), ("d", 3), ("e", 4), ("f", 0)]
            .into_iter()
            .map(|(k, f)| (k.to_string(), f))
            .collect()
    }

    #[test]
    fn keys_follow_their_fold() {
        let s = split_folds(&fold_map(), &[0, 1, 2], &[3], &[4]);
        assert_eq!(s.train, vec!["a", "b", "c", "f"]);
        assert_eq!(s.valid, vec!["d"]);
        assert_eq!(s.test, vec!["e"]);
    }

    #[test]
    fn unlisted_folds_are_omitted() {
        let s = split_folds(&fold_map(), &[1], &[], &[4]);
        assert_eq!(s.train, vec!["b"]);
        assert!(s.valid.is_empty());
        assert_eq!(s.test, vec!["e"]);
    }

    #[test]
    fn train_wins_over_valid_wins_over_test() {
        let s = split_folds(&fold_map(), &[0], &[0, 1], &[0, 1, 2]);
        assert_eq!(s.train, vec!["a", "f"]);
        assert_eq!(s.valid, vec!["b"]);
        assert_eq!(s.test, vec!["c"]);
    }

    #[test]
    fn splits_serialize_to_named_lists() {
        let s = split_folds(&fold_map(), &[0], &[1], &[2]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["valid"], serde_json::json!(["b"]));
    }
}
