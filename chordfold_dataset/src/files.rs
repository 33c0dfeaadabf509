// File discovery and naming around dataset file bases.
//
// A "file base" is a path with its final extension removed. Audio, feature
// and annotation files for one track share a file base (`track.wav`,
// `track.npz`, `track.lab`), so grouping by it reunites a track's files, and
// `filebase` / `expand_filebase` map a track to its output paths.
//
// Results are sorted or kept in first-seen order so every helper is
// deterministic, matching the rest of the workspace.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Every file under `base_dir` (recursively) whose name ends with one of
/// `extensions`. Sorted, without duplicates.
pub fn collect_nested_files<S: AsRef<str>>(
    base_dir: &Path,
    extensions: &[S],
) -> io::Result<Vec<PathBuf>> {
    let mut matched = Vec::new();
    let mut pending = vec![base_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if extensions.iter().any(|ext| name.ends_with(ext.as_ref())) {
                matched.push(path);
            }
        }
    }
    matched.sort();
    matched.dedup();
    Ok(matched)
}

/// Group paths sharing a file base. Groups appear in the order their first
/// member was seen; members keep their input order.
pub fn join_on_filebase<P: AsRef<Path>>(paths: &[P]) -> Vec<Vec<PathBuf>> {
    let mut index: BTreeMap<PathBuf, usize> = BTreeMap::new();
    let mut groups: Vec<Vec<PathBuf>> = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let base = path.with_extension("");
        let slot = *index.entry(base).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(path.to_path_buf());
    }
    groups
}

/// File name without directory or final extension.
pub fn filebase(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `output_dir/filebase.ext`. Dots around `ext` are ignored, so `"npz"`,
/// `".npz"` and `"npz."` agree.
pub fn expand_filebase(filebase: &str, output_dir: &Path, ext: &str) -> PathBuf {
    let ext = ext.trim_matches('.');
    output_dir.join(format!("{filebase}.{ext}"))
}

/// Non-empty lines of a text file, trimmed. Used for lists of paths.
pub fn load_textlist(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
