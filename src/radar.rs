use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RadarConfig;
use crate::error::RadarError;
use crate::metrics::{ScoreBreakdown, StatDeltas, flag_low_sample, score_breakdown};
use crate::table::{DEFAULT_STATS, MIN, TEAM_CITY, TEAM_NAME, Table};
use crate::teammate_impact::{named_deltas, split_with_without, summarize_with_without};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarRow {
    #[serde(rename = "STAR_OUT")]
    pub star_out: String,
    #[serde(rename = "TEAM_CITY")]
    pub team_city: String,
    #[serde(rename = "TEAM_NAME")]
    pub team_name: String,
    #[serde(rename = "BENEFICIARY")]
    pub beneficiary: String,
    #[serde(rename = "SCORE")]
    pub score: f64,
    #[serde(rename = "DELTA_PTS")]
    pub delta_pts: Option<f64>,
    #[serde(rename = "DELTA_AST")]
    pub delta_ast: Option<f64>,
    #[serde(rename = "DELTA_REB")]
    pub delta_reb: Option<f64>,
    #[serde(rename = "DELTA_MIN")]
    pub delta_min: Option<f64>,
    #[serde(rename = "N_WITHOUT")]
    pub n_without: usize,
    #[serde(rename = "N_WITH", default)]
    pub n_with: usize,
    #[serde(rename = "LOW_SAMPLE")]
    pub low_sample: bool,
}

impl RadarRow {
    pub fn deltas(&self) -> StatDeltas {
        StatDeltas {
            pts: self.delta_pts,
            ast: self.delta_ast,
            reb: self.delta_reb,
            min: self.delta_min,
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        score_breakdown(&self.deltas())
    }
}

/// A (player, team) whose average minutes clear the star threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarCandidate {
    pub player_name: String,
    pub team_city: String,
    pub team_name: String,
    pub avg_min: f64,
    pub games: usize,
}

fn require_radar_columns(table: &Table) -> Result<(), RadarError> {
    table.require_column(TEAM_CITY)?;
    table.require_column(TEAM_NAME)?;
    table.require_column(MIN)
}

/// Players whose average MIN within one team is at least `threshold`.
/// A player who moved teams is judged separately for each team.
pub fn find_stars(table: &Table, threshold: f64) -> Result<Vec<StarCandidate>, RadarError> {
    require_radar_columns(table)?;

    // (player, city, team) -> (minutes sum, defined minute cells, games)
    let mut groups: BTreeMap<(&str, &str, &str), (f64, usize, usize)> = BTreeMap::new();
    for row in 0..table.len() {
        let Some((city, team)) = table.team_of(row) else {
            continue;
        };
        let entry = groups
            .entry((table.player_name(row), city, team))
            .or_insert((0.0, 0, 0));
        entry.2 += 1;
        if let Some(min) = table.value(MIN, row) {
            entry.0 += min;
            entry.1 += 1;
        }
    }

    Ok(groups
        .into_iter()
        .filter(|(_, (_, n_min, _))| *n_min > 0)
        .map(|((player, city, team), (sum, n_min, games))| StarCandidate {
            player_name: player.to_string(),
            team_city: city.to_string(),
            team_name: team.to_string(),
            avg_min: sum / n_min as f64,
            games,
        })
        .filter(|s| s.avg_min >= threshold)
        .collect())
}

/// Rank every teammate of every star by how much their numbers rise when
/// the star does not play.
pub fn build_radar(table: &Table, cfg: &RadarConfig) -> Result<Vec<RadarRow>, RadarError> {
    let stars = find_stars(table, cfg.star_min_threshold)?;

    let mut rows: Vec<RadarRow> = stars
        .par_iter()
        .flat_map_iter(|star| rows_for_star(table, star, cfg.min_games_without))
        .collect();
    sort_radar(&mut rows);

    info!(
        stars = stars.len(),
        rows = rows.len(),
        threshold = cfg.star_min_threshold,
        "built league radar"
    );
    Ok(rows)
}

fn rows_for_star(table: &Table, star: &StarCandidate, min_games_without: usize) -> Vec<RadarRow> {
    let team = table.select(&table.rows_for_team(&star.team_city, &star.team_name));
    let star_dates = team.dates(&team.rows_for_player(&star.player_name));
    if star_dates.is_empty() {
        debug!(star = %star.player_name, team = %star.team_name, "star has no dated games, skipping");
        return Vec::new();
    }

    let mut out = Vec::new();
    for beneficiary in team.player_names() {
        if beneficiary == star.player_name {
            continue;
        }
        let rows = team.rows_for_player(beneficiary);
        let (with_rows, without_rows) = split_with_without(&team, &rows, &star_dates);
        let n_without = without_rows.len();
        if n_without < min_games_without {
            debug!(
                star = %star.player_name,
                beneficiary,
                n_without,
                "not enough games without star"
            );
            continue;
        }

        let deltas = named_deltas(&summarize_with_without(
            &team,
            &with_rows,
            &without_rows,
            &DEFAULT_STATS,
        ));
        out.push(RadarRow {
            star_out: star.player_name.clone(),
            team_city: star.team_city.clone(),
            team_name: star.team_name.clone(),
            beneficiary: beneficiary.to_string(),
            score: deltas.score(),
            delta_pts: deltas.pts,
            delta_ast: deltas.ast,
            delta_reb: deltas.reb,
            delta_min: deltas.min,
            n_without,
            n_with: with_rows.len(),
            low_sample: flag_low_sample(n_without, min_games_without),
        });
    }
    out
}

/// SCORE descending; ties by beneficiary, star, then team.
pub fn sort_radar(rows: &mut [RadarRow]) {
    rows.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.beneficiary.cmp(&b.beneficiary))
            .then_with(|| a.star_out.cmp(&b.star_out))
            .then_with(|| a.team_city.cmp(&b.team_city))
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
}

pub fn rescore(rows: &mut [RadarRow]) {
    for row in rows.iter_mut() {
        row.score = row.deltas().score();
    }
    sort_radar(rows);
}

pub fn top_for_star<'a>(rows: &'a [RadarRow], star: &str, n: usize) -> Vec<&'a RadarRow> {
    rows.iter().filter(|r| r.star_out == star).take(n).collect()
}
