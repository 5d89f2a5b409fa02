use std::fs;
use std::path::PathBuf;

use teammate_radar::config::RadarConfig;
use teammate_radar::dataset::{load_csv, load_csv_from_reader};
use teammate_radar::error::DatasetError;
use teammate_radar::export::{RADAR_COLUMNS, write_radar};
use teammate_radar::radar::{RadarRow, build_radar};
use teammate_radar::table::{AST, MIN, PTS, REB, TEAM_CITY, TEAM_NAME};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn fixture_headers_are_normalized() {
    let table = load_csv(&fixture_path("box_scores.csv")).expect("fixture should load");

    // One line has no player name and is dropped.
    assert_eq!(table.len(), 50);
    for column in [TEAM_CITY, TEAM_NAME, MIN, PTS, REB, AST, "STL"] {
        assert!(table.has_column(column), "{column} should be present");
    }
    assert!(!table.has_column("TEAM_ABBREVIATION"));

    let nikola = table.rows_for_player("Nikola");
    assert_eq!(nikola.len(), 8);
    assert_eq!(table.mean(MIN, &nikola), Some(35.5));
    // ISO and "OCT 26, 2024" style dates land on the same calendar days.
    let aaron = table.rows_for_player("Aaron");
    assert_eq!(table.dates(&nikola).intersection(&table.dates(&aaron)).count(), 8);

    let christian = table.rows_for_player("Christian");
    assert_eq!(table.game_date(christian[0]), None);
}

#[test]
fn missing_date_column_is_structural() {
    let raw = "PLAYER_NAME,PTS\nSomeone,10\n";
    let err = load_csv_from_reader(raw.as_bytes()).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn { ref column, .. } if column == "GAME_DATE"));
}

#[test]
fn fixture_radar_end_to_end() {
    let table = load_csv(&fixture_path("box_scores.csv")).unwrap();
    let rows = build_radar(&table, &RadarConfig::default()).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.star_out, "Nikola");
    assert_eq!(row.beneficiary, "Jamal");
    assert_eq!(row.n_without, 10);
    assert_eq!(row.delta_pts, Some(8.0));
    assert_eq!(row.delta_min, Some(2.0));
    assert_eq!(row.delta_reb, Some(1.0));
    assert_eq!(row.delta_ast, Some(2.0));
    assert_eq!(row.score, 13.0);
}

#[test]
fn radar_reports_round_trip() {
    let table = load_csv(&fixture_path("box_scores.csv")).unwrap();
    let rows = build_radar(&table, &RadarConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("out").join("radar.csv");
    write_radar(&csv_path, &rows, true).unwrap();
    let written = fs::read_to_string(&csv_path).unwrap();
    let header = written.lines().next().unwrap();
    assert!(header.starts_with(&RADAR_COLUMNS.join(",")));
    assert!(header.ends_with("SCORE_RECOMPUTED"));
    assert_eq!(written.lines().count(), 2);

    let json_path = dir.path().join("radar.json");
    write_radar(&json_path, &rows, false).unwrap();
    let parsed: Vec<RadarRow> = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed, rows);

    let xlsx_path = dir.path().join("radar.xlsx");
    write_radar(&xlsx_path, &rows, false).unwrap();
    assert!(fs::metadata(&xlsx_path).unwrap().len() > 0);

    assert!(write_radar(&dir.path().join("radar.txt"), &rows, false).is_err());
}
