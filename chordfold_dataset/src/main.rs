// CLI for averaging per-fold evaluation scores.
//
// Usage:
//   average_results <score_textlist> <output_file>
//
// `score_textlist` is a text file with one score JSON path per line (one per
// fold). Prints the mean±std table and writes it to `output_file` as
// `{"headers": [...], "table": [[...], ...]}`.

use chordfold_dataset::{ResultTable, collapse_results, load_textlist};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }
    if args.len() != 3 {
        print_usage();
        std::process::exit(1);
    }
    let textlist = &args[1];
    let output = &args[2];

    let score_files = match load_textlist(Path::new(textlist)) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Failed to read {textlist}: {e}");
            std::process::exit(1);
        }
    };
    let data = match collapse_results(&score_files) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to aggregate scores: {e}");
            std::process::exit(1);
        }
    };

    print_table(&data);

    let written = serde_json::to_string(&data)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(output, json).map_err(|e| e.to_string()));
    if let Err(e) = written {
        eprintln!("Error writing {output}: {e}");
        std::process::exit(1);
    }
}

/// Left-aligned columns sized to their widest cell.
fn print_table(data: &ResultTable) {
    let mut header = vec![String::new()];
    header.extend(data.headers.iter().cloned());
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &data.table {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", render(header.as_slice()));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    );
    for row in &data.table {
        println!("{}", render(row.as_slice()));
    }
}

fn print_usage() {
    println!("Usage: average_results <score_textlist> <output_file>");
}
