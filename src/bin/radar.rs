use std::path::PathBuf;

use anyhow::{Context, Result};

use teammate_radar::config::RadarConfig;
use teammate_radar::radar::{build_radar, find_stars};
use teammate_radar::{dataset, export, logging};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let data_path = arg_value(&args, "--data")
        .map(PathBuf::from)
        .context("missing --data <box_scores.csv>")?;

    let cfg = match arg_value(&args, "--config") {
        Some(path) => RadarConfig::load(&PathBuf::from(path))?,
        None => RadarConfig::default(),
    }
    .with_env_overrides()
    .context("invalid radar configuration")?;

    let table = dataset::load_csv(&data_path)?;
    let stars = find_stars(&table, cfg.star_min_threshold)?;
    let rows = build_radar(&table, &cfg)?;

    println!("League radar");
    println!("Dataset: {} ({} rows)", data_path.display(), table.len());
    println!(
        "Stars (avg MIN >= {:.1}): {}",
        cfg.star_min_threshold,
        stars.len()
    );
    println!("Pairs with >= {} games without star: {}", cfg.min_games_without, rows.len());

    let top = parse_top(arg_value(&args, "--top").as_deref())?;
    println!();
    println!(
        "{:<24} {:<24} {:>8} {:>8} {:>8} {:>8} {:>8} {:>6}",
        "STAR_OUT", "BENEFICIARY", "SCORE", "D_PTS", "D_AST", "D_REB", "D_MIN", "N_WO"
    );
    for row in rows.iter().take(top) {
        println!(
            "{:<24} {:<24} {:>8.2} {:>8} {:>8} {:>8} {:>8} {:>6}",
            row.star_out,
            row.beneficiary,
            row.score,
            fmt_delta(row.delta_pts),
            fmt_delta(row.delta_ast),
            fmt_delta(row.delta_reb),
            fmt_delta(row.delta_min),
            row.n_without
        );
    }

    if let Some(out) = arg_value(&args, "--out") {
        let out = PathBuf::from(out);
        let with_breakdown = args.iter().any(|a| a == "--breakdown");
        export::write_radar(&out, &rows, with_breakdown)?;
        println!();
        println!("Wrote {} rows to {}", rows.len(), out.display());
    }

    Ok(())
}

const DEFAULT_TOP: usize = 20;

fn parse_top(raw: Option<&str>) -> Result<usize> {
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid --top value {raw:?}")),
        None => Ok(DEFAULT_TOP),
    }
}

fn fmt_delta(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.2}")).unwrap_or_else(|| "-".to_string())
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
