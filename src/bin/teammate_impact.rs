use std::path::PathBuf;

use anyhow::{Context, Result};

use teammate_radar::config::RadarConfig;
use teammate_radar::teammate_impact::{Comparison, compare};
use teammate_radar::{dataset, export, logging};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let data_path = arg_value(&args, "--data")
        .map(PathBuf::from)
        .context("missing --data <box_scores.csv>")?;
    let player = arg_value(&args, "--player").context("missing --player <name>")?;
    let teammate = arg_value(&args, "--teammate").context("missing --teammate <name>")?;

    let cfg = RadarConfig::default()
        .with_env_overrides()
        .context("invalid radar configuration")?;
    let mut opts = cfg.compare_options();
    if let Some(raw) = arg_value(&args, "--min-games") {
        opts.min_games_without = raw
            .parse()
            .with_context(|| format!("invalid --min-games value {raw:?}"))?;
    }

    let table = dataset::load_csv(&data_path)?;
    let comparison = compare(&table, &player, &teammate, &opts)
        .with_context(|| format!("compare {player} with/without {teammate}"))?;

    println!("{player}: with vs without {teammate}");
    match &comparison {
        Comparison::InsufficientSample {
            n_with,
            n_without,
            min_required,
        } => {
            println!(
                "Not enough games without {teammate}: {n_without} (need {min_required}; {n_with} with)"
            );
        }
        Comparison::Complete(result) => {
            for line in export::comparison_table(result) {
                println!(
                    "{:<16} {:>20} {:>22} {:>26}",
                    line[0], line[1], line[2], line[3]
                );
            }
            if result.is_low_sample(cfg.low_sample_games) {
                println!();
                println!(
                    "LOW SAMPLE: only {} games without {teammate}",
                    result.n_without
                );
            }
        }
    }

    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
