// CSV box-score loader: header alias normalization into the canonical table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{info, warn};

use crate::error::DatasetError;
use crate::table::{
    AST, GAME_DATE, GameRecord, MIN, PLAYER_NAME, PTS, REB, Schema, TEAM_CITY, TEAM_NAME, Table,
};

/// Canonical column and the normalized headers accepted for it, in priority order.
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (PLAYER_NAME, &["PLAYER_NAME", "PLAYER", "NAME"]),
    (TEAM_CITY, &["TEAM_CITY", "CITY"]),
    (TEAM_NAME, &["TEAM_NAME", "TEAM"]),
    (GAME_DATE, &["GAME_DATE", "DATE"]),
    (MIN, &["MIN", "MINUTES", "MP"]),
    (PTS, &["PTS", "POINTS"]),
    (REB, &["REB", "TRB", "REBOUNDS"]),
    (AST, &["AST", "ASSISTS"]),
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

pub fn load_csv(path: &Path) -> Result<Table, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_csv_from_reader(file)?;
    info!(path = %path.display(), rows = table.len(), "loaded box scores");
    Ok(table)
}

pub fn load_csv_from_reader<R: Read>(rdr: R) -> Result<Table, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    let mut used = vec![false; headers.len()];
    let mut locate = |column: &str| -> Option<usize> {
        let (_, aliases) = COLUMN_ALIASES.iter().find(|(c, _)| *c == column)?;
        let idx = aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == alias))?;
        used[idx] = true;
        Some(idx)
    };

    let player_idx = locate(PLAYER_NAME).ok_or_else(|| missing(PLAYER_NAME))?;
    let date_idx = locate(GAME_DATE).ok_or_else(|| missing(GAME_DATE))?;
    let city_idx = locate(TEAM_CITY);
    let team_idx = locate(TEAM_NAME);
    let canonical_numeric: Vec<(&str, usize)> = [MIN, PTS, REB, AST]
        .into_iter()
        .filter_map(|c| locate(c).map(|idx| (c, idx)))
        .collect();

    // Any other column with at least one number and nothing but numbers or
    // NaN markers rides along.
    let extra_numeric: Vec<(&str, usize)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, h)| !used[*idx] && !h.is_empty())
        .filter(|(idx, _)| {
            let mut any_number = false;
            let all_numeric = records
                .iter()
                .filter_map(|r| r.get(*idx))
                .filter(|cell| !cell.is_empty())
                .all(|cell| {
                    let number = parse_number(cell).is_some();
                    any_number |= number;
                    number || is_nan_marker(cell)
                });
            all_numeric && any_number
        })
        .map(|(idx, h)| (h.as_str(), idx))
        .collect();

    let mut schema = Schema {
        team_city: city_idx.is_some(),
        team_name: team_idx.is_some(),
        numeric: Vec::new(),
    };
    for (name, _) in canonical_numeric.iter().chain(extra_numeric.iter()) {
        schema = schema.with_numeric(name);
    }

    let mut table = Table::new(&schema);
    for (line, record) in records.iter().enumerate() {
        let player = cell(record, Some(player_idx)).unwrap_or_default();
        if player.is_empty() {
            warn!(line = line + 2, "skipping row without player name");
            continue;
        }
        let mut game = GameRecord::new(player);
        game.team_city = cell(record, city_idx).map(str::to_string);
        game.team_name = cell(record, team_idx).map(str::to_string);
        game.game_date = cell(record, Some(date_idx)).and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(line = line + 2, raw, "unparseable game date");
            }
            parsed
        });
        for (name, idx) in &canonical_numeric {
            let parse = if *name == MIN { parse_minutes } else { parse_number };
            if let Some(v) = cell(record, Some(*idx)).and_then(parse) {
                game.stats.insert(name.to_string(), v);
            }
        }
        for (name, idx) in &extra_numeric {
            if let Some(v) = cell(record, Some(*idx)).and_then(parse_number) {
                game.stats.insert(name.to_string(), v);
            }
        }
        table.push(game);
    }
    Ok(table)
}

fn missing(column: &str) -> DatasetError {
    let aliases = COLUMN_ALIASES
        .iter()
        .find(|(c, _)| *c == column)
        .map(|(_, a)| a.join(", "))
        .unwrap_or_default();
    DatasetError::MissingColumn {
        column: column.to_string(),
        aliases,
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).filter(|s| !s.is_empty())
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .to_uppercase()
        .replace([' ', '-'], "_")
}

fn is_nan_marker(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "nan" | "na" | "n/a" | "null" | "none")
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    (!v.is_nan()).then_some(v)
}

/// Decimal minutes or `MM:SS`.
pub fn parse_minutes(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some((mins, secs)) = raw.split_once(':') {
        let mins = mins.trim().parse::<f64>().ok()?;
        let secs = secs.trim().parse::<f64>().ok()?;
        return Some(mins + secs / 60.0);
    }
    parse_number(raw)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_accept_clock_format() {
        assert_eq!(parse_minutes("34:30"), Some(34.5));
        assert_eq!(parse_minutes("28.25"), Some(28.25));
        assert_eq!(parse_minutes("DNP"), None);
    }

    #[test]
    fn dates_accept_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 13);
        assert_eq!(parse_date("2025-04-13"), expected);
        assert_eq!(parse_date("04/13/2025"), expected);
        assert_eq!(parse_date("APR 13, 2025"), expected);
        assert_eq!(parse_date("2025-04-13T00:00:00"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn extra_columns_need_a_number() {
        let raw = "Player,Date,PTS,BLK,NOTE,PLUS_MINUS\n\
                   Ann,2025-01-02,10,,,nan\n\
                   Ann,2025-01-03,12,,x,3\n\
                   Bo,2025-01-03,8,,,-2\n";
        let table = load_csv_from_reader(raw.as_bytes()).unwrap();
        assert!(table.has_numeric(PTS));
        assert!(table.has_numeric("PLUS_MINUS"));
        assert!(!table.has_column("BLK"));
        assert!(!table.has_column("NOTE"));
        assert_eq!(table.value("PLUS_MINUS", 0), None);
        assert_eq!(table.value("PLUS_MINUS", 2), Some(-2.0));
    }

    #[test]
    fn headers_normalize_case_and_spacing() {
        assert_eq!(normalize_header(" Player Name "), "PLAYER_NAME");
        assert_eq!(normalize_header("\u{feff}game-date"), "GAME_DATE");
    }
}
