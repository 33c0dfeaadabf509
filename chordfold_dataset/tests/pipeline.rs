// Integration tests over a real directory tree.
//
// Builds a small dataset layout under the system temp directory, then runs
// discovery -> grouping -> fold map -> splits, and writes score files for
// the aggregation path. Each test owns a uniquely named directory and
// removes it when done.

use chordfold_dataset::{
    DatasetError, collapse_results, collect_nested_files, expand_filebase, filebase,
    join_on_filebase, load_textlist, split_folds,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

struct TempTree {
    root: PathBuf,
}

impl TempTree {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "chordfold_dataset_{}_{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        TempTree { root }
    }

    fn touch(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[test]
fn collects_nested_files_by_extension() {
    let tree = TempTree::new("collect");
    tree.touch("beatles/help.wav", "");
    tree.touch("beatles/help.lab", "");
    tree.touch("beatles/abbey_road/something.wav", "");
    tree.touch("queen/bohemian.mp3", "");
    tree.touch("queen/bohemian.lab", "");

    let audio = collect_nested_files(&tree.root, &[".wav", ".mp3"]).unwrap();
    let names: Vec<String> = audio.iter().map(|p| filebase(p)).collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"help".to_string()));
    assert!(names.contains(&"something".to_string()));
    assert!(names.contains(&"bohemian".to_string()));

    let mut sorted = audio.clone();
    sorted.sort();
    assert_eq!(audio, sorted);

    // Overlapping extensions must not list a file twice.
    let labs = collect_nested_files(&tree.root, &["lab", ".lab"]).unwrap();
    assert_eq!(labs.len(), 2);
}

#[test]
fn missing_directory_is_an_io_error() {
    let missing = std::env::temp_dir().join("chordfold_dataset_does_not_exist_xyz");
    assert!(collect_nested_files(&missing, &[".wav"]).is_err());
}

#[test]
fn grouped_tracks_flow_into_splits() {
    let tree = TempTree::new("splits");
    for track in ["t0", "t1", "t2", "t3", "t4"] {
        tree.touch(&format!("{track}.wav"), "");
        tree.touch(&format!("{track}.lab"), "");
    }
    let files = collect_nested_files(&tree.root, &[".wav", ".lab"]).unwrap();
    let groups = join_on_filebase(&files);
    assert_eq!(groups.len(), 5);
    assert!(groups.iter().all(|g| g.len() == 2));

    let fold_map: BTreeMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (filebase(&g[0]), i))
        .collect();
    let splits = split_folds(&fold_map, &[0, 1, 2], &[3], &[4]);
    assert_eq!(splits.train.len(), 3);
    assert_eq!(splits.valid, vec!["t3"]);
    assert_eq!(splits.test, vec!["t4"]);

    let out = expand_filebase(&splits.test[0], Path::new("/features"), ".npz");
    assert_eq!(out, PathBuf::from("/features/t4.npz"));
}

#[test]
fn averages_score_files_from_a_textlist() {
    let tree = TempTree::new("scores");
    let a = tree.touch(
        "fold0.json",
        r#"{"class_labels": ["N"], "test": {"recall": 0.4}, "valid": {"recall": 0.5}}"#,
    );
    let b = tree.touch(
        "fold1.json",
        r#"{"class_labels": ["N"], "test": {"recall": 0.6}, "valid": {"recall": 0.5}}"#,
    );
    let list = tree.touch(
        "scores.txt",
        &format!("{}\n\n  {}  \n", a.display(), b.display()),
    );

    let files = load_textlist(&list).unwrap();
    assert_eq!(files.len(), 2);

    let table = collapse_results(&files).unwrap();
    assert_eq!(table.headers, vec!["recall"]);
    assert_eq!(table.table[0], vec!["test", "$0.500\\pm0.100$"]);
    assert_eq!(table.table[1], vec!["valid", "$0.500\\pm0.000$"]);
}

#[test]
fn unreadable_score_file_reports_io() {
    let err = collapse_results(&["/nonexistent/chordfold/fold.json"]).unwrap_err();
    assert!(matches!(err, DatasetError::Io(_)));
}
