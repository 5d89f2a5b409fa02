use serde::{Deserialize, Serialize};

pub const DEFAULT_LOW_SAMPLE_GAMES: usize = 10;

/// Undefined and non-finite values count as zero. Only scoring calls this.
pub fn nan_to_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().flatten() {
        if v.is_nan() {
            continue;
        }
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

/// Unweighted sum of the four tracked deltas. Undefined or non-finite inputs
/// add nothing; the sum itself is finite unless it overflows.
pub fn composite_score(
    delta_pts: Option<f64>,
    delta_ast: Option<f64>,
    delta_reb: Option<f64>,
    delta_min: Option<f64>,
) -> f64 {
    nan_to_zero(delta_pts)
        + nan_to_zero(delta_ast)
        + nan_to_zero(delta_reb)
        + nan_to_zero(delta_min)
}

pub fn flag_low_sample(n_without: usize, min_games: usize) -> bool {
    n_without < min_games
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDeltas {
    pub pts: Option<f64>,
    pub ast: Option<f64>,
    pub reb: Option<f64>,
    pub min: Option<f64>,
}

impl StatDeltas {
    pub fn score(&self) -> f64 {
        composite_score(self.pts, self.ast, self.reb, self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "C_PTS")]
    pub c_pts: f64,
    #[serde(rename = "C_AST")]
    pub c_ast: f64,
    #[serde(rename = "C_REB")]
    pub c_reb: f64,
    #[serde(rename = "C_MIN")]
    pub c_min: f64,
    #[serde(rename = "SCORE_RECOMPUTED")]
    pub score_recomputed: f64,
}

pub fn score_breakdown(deltas: &StatDeltas) -> ScoreBreakdown {
    ScoreBreakdown {
        c_pts: nan_to_zero(deltas.pts),
        c_ast: nan_to_zero(deltas.ast),
        c_reb: nan_to_zero(deltas.reb),
        c_min: nan_to_zero(deltas.min),
        score_recomputed: deltas.score(),
    }
}
