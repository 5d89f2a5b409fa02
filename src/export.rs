use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::radar::RadarRow;
use crate::teammate_impact::ComparisonResult;

pub const RADAR_COLUMNS: [&str; 11] = [
    "STAR_OUT",
    "TEAM_CITY",
    "TEAM_NAME",
    "BENEFICIARY",
    "SCORE",
    "DELTA_PTS",
    "DELTA_AST",
    "DELTA_REB",
    "DELTA_MIN",
    "N_WITHOUT",
    "LOW_SAMPLE",
];

pub const BREAKDOWN_COLUMNS: [&str; 5] = ["C_PTS", "C_AST", "C_REB", "C_MIN", "SCORE_RECOMPUTED"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

pub fn radar_table(rows: &[RadarRow], with_breakdown: bool) -> Vec<Vec<String>> {
    let mut header: Vec<String> = RADAR_COLUMNS.iter().map(|c| c.to_string()).collect();
    if with_breakdown {
        header.extend(BREAKDOWN_COLUMNS.iter().map(|c| c.to_string()));
    }
    let mut out = vec![header];
    out.extend(rows.iter().map(|row| radar_line(row, with_breakdown)));
    out
}

fn radar_line(row: &RadarRow, with_breakdown: bool) -> Vec<String> {
    let mut line = vec![
        row.star_out.clone(),
        row.team_city.clone(),
        row.team_name.clone(),
        row.beneficiary.clone(),
        row.score.to_string(),
        opt_to_string(row.delta_pts),
        opt_to_string(row.delta_ast),
        opt_to_string(row.delta_reb),
        opt_to_string(row.delta_min),
        row.n_without.to_string(),
        row.low_sample.to_string(),
    ];
    if with_breakdown {
        let b = row.breakdown();
        line.extend([
            b.c_pts.to_string(),
            b.c_ast.to_string(),
            b.c_reb.to_string(),
            b.c_min.to_string(),
            b.score_recomputed.to_string(),
        ]);
    }
    line
}

/// Stat-indexed comparison table followed by the two sample-count rows.
pub fn comparison_table(result: &ComparisonResult) -> Vec<Vec<String>> {
    let mut out = vec![vec![
        "stat".to_string(),
        "with_teammate_avg".to_string(),
        "without_teammate_avg".to_string(),
        "delta_without_minus_with".to_string(),
    ]];
    for s in &result.stats {
        out.push(vec![
            s.stat.clone(),
            opt_to_string(s.with_avg),
            opt_to_string(s.without_avg),
            opt_to_string(s.delta),
        ]);
    }
    out.push(vec![
        "N_GAMES_WITH".to_string(),
        result.n_with.to_string(),
        String::new(),
        String::new(),
    ]);
    out.push(vec![
        "N_GAMES_WITHOUT".to_string(),
        String::new(),
        result.n_without.to_string(),
        String::new(),
    ]);
    out
}

pub fn write_radar(path: &Path, rows: &[RadarRow], with_breakdown: bool) -> Result<()> {
    match ReportFormat::from_path(path) {
        Some(ReportFormat::Csv) => write_radar_csv(path, rows, with_breakdown),
        Some(ReportFormat::Json) => write_radar_json(path, rows),
        Some(ReportFormat::Xlsx) => write_radar_xlsx(path, rows, with_breakdown),
        None => bail!(
            "unsupported report extension for {} (expected .csv, .json or .xlsx)",
            path.display()
        ),
    }
}

pub fn write_radar_csv(path: &Path, rows: &[RadarRow], with_breakdown: bool) -> Result<()> {
    ensure_parent(path);
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        for line in radar_table(rows, with_breakdown) {
            writer.write_record(&line).context("write radar csv row")?;
        }
        writer.flush().context("flush radar csv")?;
    }
    fs::rename(&tmp, path).with_context(|| format!("swap in {}", path.display()))?;
    Ok(())
}

pub fn write_radar_json(path: &Path, rows: &[RadarRow]) -> Result<()> {
    let json = serde_json::to_vec_pretty(rows).context("serialize radar rows")?;
    write_json_atomic(path, &json)
}

pub fn write_radar_xlsx(path: &Path, rows: &[RadarRow], with_breakdown: bool) -> Result<()> {
    ensure_parent(path);
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Radar")?;
        write_rows(sheet, &radar_table(rows, with_breakdown))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
}

fn write_json_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path);
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap in {}", path.display()))?;
    Ok(())
}

fn opt_to_string(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            // Header stays text; numeric cells are written as numbers.
            let written = match value.parse::<f64>() {
                Ok(num) if row_idx > 0 && num.is_finite() => worksheet.write_number(r, c, num),
                _ => worksheet.write_string(r, c, value),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
