//! Aggregation of judge submissions into product scores and the leaderboard.
//!
//! Everything in this module is a pure function of a snapshot of products,
//! criteria and submission rows; the caller owns loading the snapshot.
//!
//! # Score formula
//!
//! For every rating criterion that received at least one rating:
//!
//! ```text
//! normalised_i = mean_i / max_value_i * 10
//! total        = sum(weight_i * normalised_i) / sum(weight_i)
//! ```
//!
//! Criteria nobody rated are left out of both sums, so a missing criterion
//! never drags the score towards zero. The total lives on a 0..=10 scale;
//! [`RankedProduct::score_percent`] gives the 0..=100 presentation value.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::submission::SubmissionRecord;
use crate::types::{Criterion, CriterionType, Product};

/// Upper bound of the internal score scale.
pub const SCORE_SCALE: f64 = 10.0;

/// Aggregate of every judge's answers for one criterion of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionSummary {
    pub criterion_id: Uuid,
    pub criterion_name: String,
    pub criterion_type: CriterionType,
    pub weight: f64,
    pub max_value: i32,
    /// Mean rating among judges who rated; `None` if nobody did.
    pub avg_rating: Option<f64>,
    /// Judges who answered this criterion.
    pub count_judges: usize,
    pub true_count: usize,
    pub false_count: usize,
    /// Non-blank free-text answers.
    pub text_count: usize,
}

impl CriterionSummary {
    fn empty(criterion: &Criterion) -> Self {
        Self {
            criterion_id: criterion.id,
            criterion_name: criterion.name.clone(),
            criterion_type: criterion.criterion_type,
            weight: criterion.weight,
            max_value: criterion.max_value,
            avg_rating: None,
            count_judges: 0,
            true_count: 0,
            false_count: 0,
            text_count: 0,
        }
    }

    /// Mean rating mapped onto the 0..=10 scale.
    pub fn normalized_score(&self) -> Option<f64> {
        if self.max_value <= 0 {
            return None;
        }
        self.avg_rating
            .map(|avg| avg / f64::from(self.max_value) * SCORE_SCALE)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    /// Weighted score on the 0..=10 scale, rounded to two decimals.
    pub total_score: f64,
    /// Mean of every raw rating recorded for the product.
    ///
    /// Ratings are averaged as given, across criteria whose `max_value` may
    /// differ (a 4 on a 1..=5 scale and a 4 on a 1..=10 scale count alike).
    /// Use `total_score` for a scale-normalized comparison.
    pub avg_rating: Option<f64>,
    /// Distinct judges with at least one submission for the product.
    pub judges_count: usize,
    /// Dense rank, starting at 1.
    pub rank: u32,
}

impl RankedProduct {
    /// Total score on the 0..=100 presentation scale.
    pub fn score_percent(&self) -> f64 {
        round2(self.total_score * 10.0)
    }
}

/// Per-criterion summary of one product, in `criteria` order.
///
/// Rows for other products are ignored, as are rows whose field does not
/// match the criterion type.
pub fn summarize_product(
    product_id: Uuid,
    criteria: &[Criterion],
    submissions: &[SubmissionRecord],
) -> Vec<CriterionSummary> {
    let mut by_criterion: HashMap<Uuid, Vec<&SubmissionRecord>> = HashMap::new();
    for row in submissions.iter().filter(|s| s.product_id == product_id) {
        by_criterion.entry(row.criterion_id).or_default().push(row);
    }

    criteria
        .iter()
        .map(|criterion| {
            let rows = by_criterion
                .get(&criterion.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            summarize_criterion(criterion, rows)
        })
        .collect()
}

fn summarize_criterion(criterion: &Criterion, rows: &[&SubmissionRecord]) -> CriterionSummary {
    let mut summary = CriterionSummary::empty(criterion);

    match criterion.criterion_type {
        CriterionType::Rating => {
            let ratings: Vec<i32> = rows.iter().filter_map(|r| r.rating_value).collect();
            summary.count_judges = ratings.len();
            summary.avg_rating = mean(&ratings).map(round2);
        }
        CriterionType::Boolean => {
            for value in rows.iter().filter_map(|r| r.boolean_value) {
                if value {
                    summary.true_count += 1;
                } else {
                    summary.false_count += 1;
                }
            }
            summary.count_judges = summary.true_count + summary.false_count;
        }
        CriterionType::Text => {
            summary.text_count = rows
                .iter()
                .filter_map(|r| r.text_value.as_deref())
                .filter(|text| !text.trim().is_empty())
                .count();
            summary.count_judges = summary.text_count;
        }
    }

    summary
}

/// Weighted overall score on the 0..=10 scale.
///
/// Returns 0 when no weighted rating criterion has been rated.
pub fn overall_score(summaries: &[CriterionSummary]) -> f64 {
    let (weighted, weights) = summaries
        .iter()
        .filter(|s| s.criterion_type == CriterionType::Rating)
        .filter_map(|s| s.normalized_score().map(|score| (score, s.weight)))
        .fold((0.0, 0.0), |(acc, total), (score, weight)| {
            (acc + score * weight, total + weight)
        });

    if weights <= 0.0 {
        return 0.0;
    }
    round2((weighted / weights).clamp(0.0, SCORE_SCALE))
}

/// Ranks every product in `products` that has at least one submission.
///
/// Ordering is total score descending, then product id ascending. Products
/// with equal scores share a dense rank.
pub fn compute_leaderboard(
    products: &[Product],
    criteria: &[Criterion],
    submissions: &[SubmissionRecord],
) -> Vec<RankedProduct> {
    let mut rows_by_product: HashMap<Uuid, Vec<SubmissionRecord>> = HashMap::new();
    for row in submissions {
        rows_by_product
            .entry(row.product_id)
            .or_default()
            .push(row.clone());
    }

    let mut board: Vec<RankedProduct> = products
        .iter()
        .filter_map(|product| {
            let rows = rows_by_product.get(&product.id)?;
            if rows.is_empty() {
                return None;
            }

            let summary = summarize_product(product.id, criteria, rows);
            let judges: HashSet<Uuid> = rows.iter().map(|r| r.judge_id).collect();
            let ratings: Vec<i32> = rows.iter().filter_map(|r| r.rating_value).collect();

            Some(RankedProduct {
                product_id: product.id,
                product_name: product.name.clone(),
                product_image: product.image_url.clone(),
                total_score: overall_score(&summary),
                avg_rating: mean(&ratings).map(round2),
                judges_count: judges.len(),
                rank: 0,
            })
        })
        .collect();

    board.sort_by(compare_entries);
    assign_dense_ranks(&mut board);
    board
}

fn compare_entries(a: &RankedProduct, b: &RankedProduct) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.product_id.cmp(&b.product_id))
}

fn assign_dense_ranks(board: &mut [RankedProduct]) {
    let mut rank = 0;
    let mut previous: Option<f64> = None;
    for entry in board.iter_mut() {
        if previous != Some(entry.total_score) {
            rank += 1;
            previous = Some(entry.total_score);
        }
        entry.rank = rank;
    }
}

fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// Rounds to two decimals, the precision scores are published with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
