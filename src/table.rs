use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::RadarError;
use crate::metrics;

pub const PLAYER_NAME: &str = "PLAYER_NAME";
pub const TEAM_CITY: &str = "TEAM_CITY";
pub const TEAM_NAME: &str = "TEAM_NAME";
pub const GAME_DATE: &str = "GAME_DATE";
pub const MIN: &str = "MIN";
pub const PTS: &str = "PTS";
pub const REB: &str = "REB";
pub const AST: &str = "AST";

pub const DEFAULT_STATS: [&str; 4] = [MIN, PTS, REB, AST];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameRecord {
    pub player_name: String,
    pub team_city: Option<String>,
    pub team_name: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub stats: BTreeMap<String, f64>,
}

impl GameRecord {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            ..Default::default()
        }
    }

    pub fn team(mut self, city: impl Into<String>, name: impl Into<String>) -> Self {
        self.team_city = Some(city.into());
        self.team_name = Some(name.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.game_date = Some(date);
        self
    }

    pub fn stat(mut self, column: &str, value: f64) -> Self {
        self.stats.insert(column.to_string(), value);
        self
    }
}

/// PLAYER_NAME and GAME_DATE are always present; everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub team_city: bool,
    pub team_name: bool,
    pub numeric: Vec<String>,
}

impl Schema {
    pub fn box_score() -> Self {
        Self {
            team_city: true,
            team_name: true,
            numeric: DEFAULT_STATS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn without(mut self, column: &str) -> Self {
        match column {
            TEAM_CITY => self.team_city = false,
            TEAM_NAME => self.team_name = false,
            other => self.numeric.retain(|c| c != other),
        }
        self
    }

    pub fn with_numeric(mut self, column: &str) -> Self {
        if !self.numeric.iter().any(|c| c == column) {
            self.numeric.push(column.to_string());
        }
        self
    }
}

/// Column-oriented game log. Undefined cells are `None`; absent columns are
/// absent, never zero-filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    player_name: Vec<String>,
    game_date: Vec<Option<NaiveDate>>,
    team_city: Option<Vec<Option<String>>>,
    team_name: Option<Vec<Option<String>>>,
    numeric: BTreeMap<String, Vec<Option<f64>>>,
}

impl Table {
    pub fn new(schema: &Schema) -> Self {
        Self {
            player_name: Vec::new(),
            game_date: Vec::new(),
            team_city: schema.team_city.then(Vec::new),
            team_name: schema.team_name.then(Vec::new),
            numeric: schema
                .numeric
                .iter()
                .map(|c| (c.clone(), Vec::new()))
                .collect(),
        }
    }

    pub fn from_records<I>(schema: &Schema, records: I) -> Self
    where
        I: IntoIterator<Item = GameRecord>,
    {
        let mut table = Self::new(schema);
        for record in records {
            table.push(record);
        }
        table
    }

    /// Append a record. Values for columns outside the schema are dropped and
    /// NaN stats are stored as undefined.
    pub fn push(&mut self, record: GameRecord) {
        if let Some(col) = self.team_city.as_mut() {
            col.push(record.team_city);
        }
        if let Some(col) = self.team_name.as_mut() {
            col.push(record.team_name);
        }
        for (name, col) in self.numeric.iter_mut() {
            col.push(record.stats.get(name).copied().filter(|v| !v.is_nan()));
        }
        self.player_name.push(record.player_name);
        self.game_date.push(record.game_date);
    }

    pub fn len(&self) -> usize {
        self.player_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_name.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        match name {
            PLAYER_NAME | GAME_DATE => true,
            TEAM_CITY => self.team_city.is_some(),
            TEAM_NAME => self.team_name.is_some(),
            other => self.numeric.contains_key(other),
        }
    }

    pub fn has_numeric(&self, name: &str) -> bool {
        self.numeric.contains_key(name)
    }

    pub fn require_column(&self, name: &str) -> Result<(), RadarError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(RadarError::MissingColumn {
                column: name.to_string(),
            })
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        let mut out = vec![PLAYER_NAME];
        if self.team_city.is_some() {
            out.push(TEAM_CITY);
        }
        if self.team_name.is_some() {
            out.push(TEAM_NAME);
        }
        out.push(GAME_DATE);
        out.extend(self.numeric.keys().map(String::as_str));
        out
    }

    pub fn player_name(&self, row: usize) -> &str {
        &self.player_name[row]
    }

    pub fn game_date(&self, row: usize) -> Option<NaiveDate> {
        self.game_date[row]
    }

    pub fn team_of(&self, row: usize) -> Option<(&str, &str)> {
        let city = self.team_city.as_ref()?[row].as_deref()?;
        let name = self.team_name.as_ref()?[row].as_deref()?;
        Some((city, name))
    }

    pub fn value(&self, column: &str, row: usize) -> Option<f64> {
        self.numeric.get(column).and_then(|col| col[row])
    }

    pub fn rows_for_player(&self, name: &str) -> Vec<usize> {
        self.player_name
            .iter()
            .enumerate()
            .filter(|(_, p)| p.as_str() == name)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn rows_for_team(&self, city: &str, name: &str) -> Vec<usize> {
        (0..self.len())
            .filter(|&row| self.team_of(row) == Some((city, name)))
            .collect()
    }

    pub fn select(&self, rows: &[usize]) -> Table {
        Table {
            player_name: rows.iter().map(|&r| self.player_name[r].clone()).collect(),
            game_date: rows.iter().map(|&r| self.game_date[r]).collect(),
            team_city: self
                .team_city
                .as_ref()
                .map(|col| rows.iter().map(|&r| col[r].clone()).collect()),
            team_name: self
                .team_name
                .as_ref()
                .map(|col| rows.iter().map(|&r| col[r].clone()).collect()),
            numeric: self
                .numeric
                .iter()
                .map(|(name, col)| (name.clone(), rows.iter().map(|&r| col[r]).collect()))
                .collect(),
        }
    }

    pub fn dates(&self, rows: &[usize]) -> BTreeSet<NaiveDate> {
        rows.iter().filter_map(|&r| self.game_date[r]).collect()
    }

    pub fn player_names(&self) -> BTreeSet<&str> {
        self.player_name.iter().map(String::as_str).collect()
    }

    pub fn mean(&self, column: &str, rows: &[usize]) -> Option<f64> {
        let col = self.numeric.get(column)?;
        metrics::mean(rows.iter().map(|&r| col[r]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn absent_columns_are_reported_missing() {
        let table = Table::new(&Schema::box_score().without(MIN).without(TEAM_CITY));
        assert!(!table.has_column(MIN));
        assert!(!table.has_column(TEAM_CITY));
        assert!(table.has_column(TEAM_NAME));
        assert!(table.has_column(GAME_DATE));
        assert!(!table.has_numeric(GAME_DATE));
        assert!(!table.has_numeric(TEAM_NAME));
        assert!(table.has_numeric(PTS));
        assert_eq!(
            table.require_column(MIN),
            Err(RadarError::MissingColumn {
                column: MIN.to_string()
            })
        );
    }

    #[test]
    fn nan_stats_are_stored_undefined() {
        let table = Table::from_records(
            &Schema::box_score(),
            [
                GameRecord::new("A").on(day(1)).stat(PTS, f64::NAN),
                GameRecord::new("A").on(day(2)).stat(PTS, 12.0),
            ],
        );
        assert_eq!(table.value(PTS, 0), None);
        assert_eq!(table.value(REB, 1), None);
        assert_eq!(table.mean(PTS, &[0, 1]), Some(12.0));
        assert_eq!(table.mean(PTS, &[0]), None);
    }

    #[test]
    fn select_keeps_schema_and_order() {
        let table = Table::from_records(
            &Schema::box_score(),
            [
                GameRecord::new("A").team("Boston", "Celtics").on(day(1)).stat(MIN, 30.0),
                GameRecord::new("B").team("Boston", "Celtics").on(day(1)).stat(MIN, 20.0),
                GameRecord::new("C").team("Miami", "Heat").stat(MIN, 10.0),
            ],
        );
        let team = table.select(&table.rows_for_team("Boston", "Celtics"));
        assert_eq!(team.len(), 2);
        assert_eq!(team.column_names(), table.column_names());
        assert_eq!(team.player_name(1), "B");
        assert_eq!(team.dates(&[0, 1]).len(), 1);
        assert_eq!(table.dates(&[2]).len(), 0);
    }
}
