// CLI entry point for fold stratification.
//
// Reads a JSON object mapping item keys (track ids, file bases) to class
// labels, searches for a class-balanced K-fold assignment, and writes the
// resulting fold map (`key -> fold index`) as JSON. The fold map is what
// `chordfold_dataset::splits::split_folds` partitions into train/valid/test.
//
// Usage:
//   stratify <labels.json> [output.json] [--config FILE] [--pop-size N]
//     [--iterations N] [--folds K] [--penalty F] [--mutation-rate F]
//     [--seed N] [--verbose]
//
// Flags override values from `--config`. Without a seed from either source,
// the generator is seeded from the system clock and the seed is printed so
// the run can be repeated.

use chordfold_stratify::fitness::fold_mass;
use chordfold_stratify::{FoldRng, SampleMatrix, StratifyConfig, stratify};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let positional: Vec<&str> = positional_args(&args);
    let Some(&labels_path) = positional.first() else {
        eprintln!("Missing labels file.");
        print_usage();
        std::process::exit(1);
    };
    let output_path = positional.get(1).copied().unwrap_or("folds.json");

    let mut config = match parse_flag::<String>(&args, "--config") {
        Some(path) => match load_config(Path::new(&path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => StratifyConfig::default(),
    };
    if let Some(v) = parse_flag(&args, "--pop-size") {
        config.pop_size = v;
    }
    if let Some(v) = parse_flag(&args, "--iterations") {
        config.n_iter = v;
    }
    if let Some(v) = parse_flag(&args, "--folds") {
        config.num_folds = v;
    }
    if let Some(v) = parse_flag(&args, "--penalty") {
        config.fitness_penalty = v;
    }
    if let Some(v) = parse_flag(&args, "--mutation-rate") {
        config.mutation_rate = v;
    }
    if let Some(v) = parse_flag(&args, "--seed") {
        config.seed = Some(v);
    }
    if args.iter().any(|a| a == "--verbose") {
        config.verbose = true;
    }
    let seed = config.seed.unwrap_or_else(clock_seed);

    let (keys, labels) = match load_labels(Path::new(labels_path)) {
        Ok(kl) => kl,
        Err(e) => {
            eprintln!("Failed to read labels from {labels_path}: {e}");
            std::process::exit(1);
        }
    };
    let (samples, classes) = match SampleMatrix::from_named_labels(&labels) {
        Ok(sc) => sc,
        Err(e) => {
            eprintln!("Invalid labels: {e}");
            std::process::exit(1);
        }
    };

    println!("=== Fold Stratification ===");
    println!("Samples: {} ({} classes)", samples.rows(), classes.len());
    println!("Folds: {}", config.num_folds);
    println!(
        "Population: {}, generations: {}",
        config.pop_size, config.n_iter
    );
    println!(
        "Penalty: {}, mutation rate: {}",
        config.fitness_penalty, config.mutation_rate
    );
    println!("Seed: {seed}");
    println!();

    let mut rng = FoldRng::new(seed);
    let result = match stratify(&samples, &config, &mut rng) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Stratification failed: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Stopped after {} generations ({:?}).",
        result.generations, result.termination
    );
    println!(
        "Fitness: {:.5} (initial mean {:.5}, {} improvements)",
        result.best_fitness,
        result.initial_mean_fitness,
        result.history.len()
    );
    println!();

    match fold_mass(&result.best, &samples) {
        Ok(mass) => print_fold_table(&mass, &classes, config.num_folds),
        Err(e) => eprintln!("  Could not tabulate folds: {e}"),
    }

    let fold_map = match result.best.fold_map(&keys) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Could not build fold map: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = write_fold_map(&fold_map, Path::new(output_path)) {
        eprintln!("Error writing {output_path}: {e}");
        std::process::exit(1);
    }
    println!();
    println!("Wrote fold map to {output_path}");
}

/// Keys in sorted order and their labels. Non-string labels (class
/// indices) are stringified, with whole numbers written as integers so `1`
/// and `1.0` name the same class.
fn load_labels(path: &Path) -> Result<(Vec<String>, Vec<String>), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&text)?;
    let mut keys = Vec::with_capacity(raw.len());
    let mut labels = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        keys.push(key);
        labels.push(label_text(value));
    }
    Ok((keys, labels))
}

fn label_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => match n.as_f64() {
            // Below 2^53 every whole f64 converts to i64 exactly.
            Some(x) if n.is_f64() && x.fract() == 0.0 && x.abs() < 9.0e15 => {
                (x as i64).to_string()
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn load_config(path: &Path) -> Result<StratifyConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(StratifyConfig::from_json(&text)?)
}

fn write_fold_map(
    fold_map: &BTreeMap<String, usize>,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(fold_map)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Samples of each class per fold, one row per fold.
fn print_fold_table(mass: &[f64], classes: &[String], num_folds: usize) {
    let cols = classes.len();
    print!("{:>6}", "fold");
    for class in classes {
        print!(" {class:>8}");
    }
    println!();
    for fold in 0..num_folds {
        print!("{fold:>6}");
        for v in &mass[fold * cols..(fold + 1) * cols] {
            print!(" {v:>8}");
        }
        println!();
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Arguments that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<&str> {
    const VALUE_FLAGS: [&str; 7] = [
        "--config",
        "--pop-size",
        "--iterations",
        "--folds",
        "--penalty",
        "--mutation-rate",
        "--seed",
    ];
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args.iter().skip(1) {
        if skip {
            skip = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn print_usage() {
    println!("Usage: stratify <labels.json> [output.json] [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>         JSON run config (flags override it)");
    println!("  --pop-size <N>          Candidates per generation (default: 50)");
    println!("  --iterations <N>        Generation budget (default: 500)");
    println!("  --folds <K>             Number of folds (default: 5)");
    println!("  --penalty <F>           Selection pressure (default: 4.0)");
    println!("  --mutation-rate <F>     Per-sample mutation probability (default: 0.005)");
    println!("  --seed <N>              Generator seed (default: system clock)");
    println!("  --verbose               Print each new best fitness");
    println!("  --help, -h              Show this help");
}
