// Dataset plumbing around stratified folds.
//
// The pieces a cross-validation experiment needs on either side of the fold
// search in `chordfold_stratify`:
//
// - `files.rs`: recursive file discovery by extension, grouping by file
//   base, file base and output path construction, text path lists
// - `splits.rs`: partition a `key -> fold` map into train/valid/test keys
// - `results.rs`: average per-fold score files into a mean±std table
// - `error.rs`: `DatasetError` for the file-reading helpers
//
// No randomness lives here, and outputs are ordered (sorted keys, sorted
// paths, first-seen groups) so repeated runs agree.

pub mod error;
pub mod files;
pub mod results;
pub mod splits;

pub use error::DatasetError;
pub use files::{collect_nested_files, expand_filebase, filebase, join_on_filebase, load_textlist};
pub use results::{ResultTable, collapse_results};
pub use splits::{Splits, split_folds};
