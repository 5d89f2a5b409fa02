// Radar thresholds and stat selection: defaults, radar.toml, RADAR_* env vars.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::metrics::DEFAULT_LOW_SAMPLE_GAMES;
use crate::table::{DEFAULT_STATS, GAME_DATE, PLAYER_NAME, TEAM_CITY, TEAM_NAME};
use crate::teammate_impact::{CompareOptions, DEFAULT_COMPARE_MIN_GAMES};

pub const DEFAULT_STAR_MIN_THRESHOLD: f64 = 30.0;
pub const DEFAULT_MIN_GAMES_WITHOUT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RadarConfig {
    pub stats: Vec<String>,
    pub star_min_threshold: f64,
    /// Radar pairs with fewer games without the star are dropped.
    pub min_games_without: usize,
    /// Pairwise comparisons with fewer games without the reference are empty.
    pub compare_min_games_without: usize,
    /// LOW_SAMPLE threshold applied to pairwise comparisons.
    pub low_sample_games: usize,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            stats: DEFAULT_STATS.iter().map(|s| s.to_string()).collect(),
            star_min_threshold: DEFAULT_STAR_MIN_THRESHOLD,
            min_games_without: DEFAULT_MIN_GAMES_WITHOUT,
            compare_min_games_without: DEFAULT_COMPARE_MIN_GAMES,
            low_sample_games: DEFAULT_LOW_SAMPLE_GAMES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RadarFile {
    #[serde(default)]
    stats: Option<Vec<String>>,
    #[serde(default)]
    star_min_threshold: Option<f64>,
    #[serde(default)]
    min_games_without: Option<usize>,
    #[serde(default)]
    compare_min_games_without: Option<usize>,
    #[serde(default)]
    low_sample_games: Option<usize>,
}

impl RadarConfig {
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            min_games_without: self.compare_min_games_without,
            stats: self.stats.clone(),
        }
    }

    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: RadarFile = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::default();
        if let Some(stats) = file.stats {
            cfg.stats = stats.into_iter().map(|s| s.trim().to_uppercase()).collect();
        }
        if let Some(v) = file.star_min_threshold {
            cfg.star_min_threshold = v;
        }
        if let Some(v) = file.min_games_without {
            cfg.min_games_without = v;
        }
        if let Some(v) = file.compare_min_games_without {
            cfg.compare_min_games_without = v;
        }
        if let Some(v) = file.low_sample_games {
            cfg.low_sample_games = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("RADAR_STAR_MIN_THRESHOLD") {
            self.star_min_threshold = parse_field("RADAR_STAR_MIN_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("RADAR_MIN_GAMES_WITHOUT") {
            self.min_games_without = parse_field("RADAR_MIN_GAMES_WITHOUT", &raw)?;
        }
        if let Some(raw) = lookup("RADAR_COMPARE_MIN_GAMES") {
            self.compare_min_games_without = parse_field("RADAR_COMPARE_MIN_GAMES", &raw)?;
        }
        if let Some(raw) = lookup("RADAR_LOW_SAMPLE_GAMES") {
            self.low_sample_games = parse_field("RADAR_LOW_SAMPLE_GAMES", &raw)?;
        }
        if let Some(raw) = lookup("RADAR_STATS") {
            self.stats = raw
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.star_min_threshold.is_finite() || self.star_min_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "star_min_threshold".to_string(),
                message: format!("must be a non-negative number, got {}", self.star_min_threshold),
            });
        }
        if self.stats.is_empty() {
            return Err(ConfigError::Invalid {
                field: "stats".to_string(),
                message: "at least one stat column is required".to_string(),
            });
        }
        if let Some(stat) = self
            .stats
            .iter()
            .find(|s| [PLAYER_NAME, GAME_DATE, TEAM_CITY, TEAM_NAME].contains(&s.as_str()))
        {
            return Err(ConfigError::Invalid {
                field: "stats".to_string(),
                message: format!("{stat} is not a numeric stat column"),
            });
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
        field: field.to_string(),
        message: format!("{raw:?}: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = RadarConfig::default();
        assert_eq!(cfg.stats, vec!["MIN", "PTS", "REB", "AST"]);
        assert_eq!(cfg.star_min_threshold, 30.0);
        assert_eq!(cfg.min_games_without, 10);
        assert_eq!(cfg.compare_min_games_without, 5);
        assert_eq!(cfg.low_sample_games, 10);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let cfg = RadarConfig::from_toml_str(
            "star_min_threshold = 32.5\nstats = [\"pts\", \"ast\"]\n",
            Path::new("radar.toml"),
        )
        .unwrap();
        assert_eq!(cfg.star_min_threshold, 32.5);
        assert_eq!(cfg.stats, vec!["PTS", "AST"]);
        assert_eq!(cfg.min_games_without, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RadarConfig::from_toml_str("star_minutes = 3", Path::new("radar.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_are_validated() {
        let vars = HashMap::from([
            ("RADAR_MIN_GAMES_WITHOUT", "6"),
            ("RADAR_STATS", "PTS, reb"),
        ]);
        let cfg = RadarConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.min_games_without, 6);
        assert_eq!(cfg.stats, vec!["PTS", "REB"]);

        let err = RadarConfig::default()
            .with_overrides(|k| (k == "RADAR_STAR_MIN_THRESHOLD").then(|| "-1".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = RadarConfig::default()
            .with_overrides(|k| (k == "RADAR_MIN_GAMES_WITHOUT").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn identity_columns_are_not_stats() {
        let err = RadarConfig::from_toml_str(
            "stats = [\"pts\", \"game_date\"]",
            Path::new("radar.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "stats"));

        let err = RadarConfig::default()
            .with_overrides(|k| (k == "RADAR_STATS").then(|| "PTS,TEAM_CITY".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
