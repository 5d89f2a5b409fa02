use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{PlayerRole, RadarError};
use crate::metrics::{StatDeltas, flag_low_sample};
use crate::table::{AST, DEFAULT_STATS, MIN, PTS, REB, Table};

pub const DEFAULT_COMPARE_MIN_GAMES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    pub min_games_without: usize,
    pub stats: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            min_games_without: DEFAULT_COMPARE_MIN_GAMES,
            stats: DEFAULT_STATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatSummary {
    pub stat: String,
    pub with_avg: Option<f64>,
    pub without_avg: Option<f64>,
    /// `without_avg - with_avg`; undefined when either side is.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub subject: String,
    pub reference: String,
    pub stats: Vec<StatSummary>,
    pub n_with: usize,
    pub n_without: usize,
}

impl ComparisonResult {
    pub fn get(&self, stat: &str) -> Option<&StatSummary> {
        self.stats.iter().find(|s| s.stat == stat)
    }

    pub fn delta(&self, stat: &str) -> Option<f64> {
        self.get(stat).and_then(|s| s.delta)
    }

    pub fn deltas(&self) -> StatDeltas {
        named_deltas(&self.stats)
    }

    pub fn is_low_sample(&self, min_games: usize) -> bool {
        flag_low_sample(self.n_without, min_games)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Comparison {
    Complete(ComparisonResult),
    InsufficientSample {
        n_with: usize,
        n_without: usize,
        min_required: usize,
    },
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        matches!(self, Comparison::InsufficientSample { .. })
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        match self {
            Comparison::Complete(result) => Some(result),
            Comparison::InsufficientSample { .. } => None,
        }
    }

    pub fn n_with(&self) -> usize {
        match self {
            Comparison::Complete(result) => result.n_with,
            Comparison::InsufficientSample { n_with, .. } => *n_with,
        }
    }

    pub fn n_without(&self) -> usize {
        match self {
            Comparison::Complete(result) => result.n_without,
            Comparison::InsufficientSample { n_without, .. } => *n_without,
        }
    }
}

pub fn named_deltas(stats: &[StatSummary]) -> StatDeltas {
    let delta = |name: &str| stats.iter().find(|s| s.stat == name).and_then(|s| s.delta);
    StatDeltas {
        pts: delta(PTS),
        ast: delta(AST),
        reb: delta(REB),
        min: delta(MIN),
    }
}

/// Partition `rows` by whether their game date is in `dates`. Rows with an
/// undefined date are never "with".
pub fn split_with_without(
    table: &Table,
    rows: &[usize],
    dates: &BTreeSet<NaiveDate>,
) -> (Vec<usize>, Vec<usize>) {
    rows.iter().copied().partition(|&row| {
        table
            .game_date(row)
            .is_some_and(|date| dates.contains(&date))
    })
}

/// Per-stat averages over the two groups. Only numeric columns present in
/// the table are summarized.
pub fn summarize_with_without<S: AsRef<str>>(
    table: &Table,
    with_rows: &[usize],
    without_rows: &[usize],
    stats: &[S],
) -> Vec<StatSummary> {
    stats
        .iter()
        .map(|s| s.as_ref())
        .filter(|stat| table.has_numeric(stat))
        .map(|stat| {
            let with_avg = table.mean(stat, with_rows);
            let without_avg = table.mean(stat, without_rows);
            let delta = match (with_avg, without_avg) {
                (Some(w), Some(wo)) => Some(wo - w),
                _ => None,
            };
            StatSummary {
                stat: stat.to_string(),
                with_avg,
                without_avg,
                delta,
            }
        })
        .collect()
}

/// How `subject`'s averages move in games where `reference` has no record.
pub fn compare(
    table: &Table,
    subject: &str,
    reference: &str,
    opts: &CompareOptions,
) -> Result<Comparison, RadarError> {
    let subject_rows = table.rows_for_player(subject);
    let reference_rows = table.rows_for_player(reference);

    if subject_rows.is_empty() {
        return Err(RadarError::NotFound {
            role: PlayerRole::Subject,
            name: subject.to_string(),
        });
    }
    if reference_rows.is_empty() {
        return Err(RadarError::NotFound {
            role: PlayerRole::Reference,
            name: reference.to_string(),
        });
    }

    let reference_dates = table.dates(&reference_rows);
    let (with_rows, without_rows) = split_with_without(table, &subject_rows, &reference_dates);
    let n_with = with_rows.len();
    let n_without = without_rows.len();

    if n_without < opts.min_games_without {
        debug!(subject, reference, n_with, n_without, "too few games without reference");
        return Ok(Comparison::InsufficientSample {
            n_with,
            n_without,
            min_required: opts.min_games_without,
        });
    }

    Ok(Comparison::Complete(ComparisonResult {
        subject: subject.to_string(),
        reference: reference.to_string(),
        stats: summarize_with_without(table, &with_rows, &without_rows, &opts.stats),
        n_with,
        n_without,
    }))
}
