//! Flat CSV export of the leaderboard.

use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::RankedProduct;
use crate::error::ScoringError;

const HEADERS: [&str; 7] = [
    "rank",
    "product_id",
    "product_name",
    "total_score",
    "score_percent",
    "avg_rating",
    "judges_count",
];

#[derive(Debug, Serialize)]
struct LeaderboardCsvRow<'a> {
    rank: u32,
    product_id: Uuid,
    product_name: &'a str,
    total_score: f64,
    score_percent: f64,
    avg_rating: Option<f64>,
    judges_count: usize,
}

/// Serializes the leaderboard: a header row, then one line per product.
///
/// `score_percent` is the 0..=100 presentation value; a product without any
/// rating leaves `avg_rating` empty.
pub fn leaderboard_csv(board: &[RankedProduct]) -> Result<String, ScoringError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .map_err(|e| ScoringError::Export(e.to_string()))?;

    for entry in board {
        writer
            .serialize(LeaderboardCsvRow {
                rank: entry.rank,
                product_id: entry.product_id,
                product_name: &entry.product_name,
                total_score: entry.total_score,
                score_percent: entry.score_percent(),
                avg_rating: entry.avg_rating,
                judges_count: entry.judges_count,
            })
            .map_err(|e| ScoringError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScoringError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ScoringError::Export(e.to_string()))
}
