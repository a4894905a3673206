// End-to-end judging scenarios
//
// These tests drive the pure judging pipeline the way the server does:
// 1. Admin assigns approved products to judges
// 2. Judges record sparse submissions, re-submitting over earlier values
// 3. Evaluation status moves through its state machine
// 4. Submissions aggregate into product summaries and the leaderboard
// 5. The leaderboard feeds certificates and the CSV export

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use showcase_scoring::{
    compute_leaderboard, leaderboard_csv, overall_score, plan_assignments, render_certificate,
    summarize_product, CertificateInput, Criterion, EvaluationState, Person, Product,
    ProductStatus, ScoringError, SectionKind, SubmissionKey, SubmissionRecord, SubmissionValue,
};
use uuid::Uuid;

/// In-test stand-in for the submission table: one row per key, sparse upserts.
#[derive(Default)]
struct SubmissionTable {
    rows: HashMap<SubmissionKey, SubmissionRecord>,
}

impl SubmissionTable {
    fn record(&mut self, key: SubmissionKey, value: SubmissionValue) {
        let now = Utc::now();
        match self.rows.get_mut(&key) {
            Some(row) => {
                row.apply(value, now);
            }
            None => {
                self.rows.insert(key, SubmissionRecord::new(key, value, now));
            }
        }
    }

    fn all(&self) -> Vec<SubmissionRecord> {
        self.rows.values().cloned().collect()
    }
}

fn approved(name: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tagline: None,
        status: ProductStatus::Approved,
        image_url: None,
    }
}

fn key(judge: Uuid, product: Uuid, criterion: Uuid) -> SubmissionKey {
    SubmissionKey {
        judge_id: judge,
        product_id: product,
        criterion_id: criterion,
    }
}

#[test]
fn test_two_judges_average_and_leaderboard() {
    let product = approved("Lantern");
    let c1 = Criterion::rating(Uuid::new_v4(), "Execution");
    let j1 = Uuid::new_v4();
    let j2 = Uuid::new_v4();

    // Both judges are assignable to the approved product.
    let plan = plan_assignments(&[product.id], &[product.clone()], &HashSet::new()).unwrap();
    assert_eq!(plan, vec![product.id]);

    let mut table = SubmissionTable::default();
    table.record(key(j1, product.id, c1.id), SubmissionValue::Rating(4));
    table.record(key(j2, product.id, c1.id), SubmissionValue::Rating(2));
    let rows = table.all();

    let summary = summarize_product(product.id, &[c1.clone()], &rows);
    assert_eq!(summary[0].avg_rating, Some(3.0));
    assert_eq!(summary[0].count_judges, 2);

    let board = compute_leaderboard(&[product.clone()], &[c1], &rows);
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].product_id, product.id);
    assert_eq!(board[0].avg_rating, Some(3.0));
    assert_eq!(board[0].judges_count, 2);
    assert_eq!(board[0].rank, 1);
    // 3.0 / 5 on the 0..=10 scale.
    assert_eq!(board[0].total_score, 6.0);
}

#[test]
fn test_draft_product_cannot_be_assigned() {
    let mut draft = approved("Half-built");
    draft.status = ProductStatus::Draft;

    let err = plan_assignments(&[draft.id], &[draft.clone()], &HashSet::new()).unwrap_err();
    assert!(matches!(err, ScoringError::NotAssignable { .. }));
}

#[test]
fn test_repeated_assignment_is_refused() {
    let product = approved("Lantern");
    let mut assigned = HashSet::new();

    let first = plan_assignments(&[product.id], &[product.clone()], &assigned).unwrap();
    assigned.extend(first);

    let second = plan_assignments(&[product.id], &[product.clone()], &assigned);
    assert!(matches!(second, Err(ScoringError::AlreadyAssigned(_))));
    assert_eq!(assigned.len(), 1);
}

#[test]
fn test_boolean_resubmission_keeps_single_row() {
    let product = approved("Lantern");
    let c2 = Criterion::boolean(Uuid::new_v4(), "Ships a demo");
    let judge = Uuid::new_v4();
    let k = key(judge, product.id, c2.id);

    let mut table = SubmissionTable::default();
    table.record(k, SubmissionValue::Boolean(true));
    table.record(k, SubmissionValue::Boolean(false));

    let rows = table.all();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].boolean_value, Some(false));
}

#[test]
fn test_identical_resubmission_is_idempotent() {
    let product = approved("Lantern");
    let c1 = Criterion::rating(Uuid::new_v4(), "Execution");
    let k = key(Uuid::new_v4(), product.id, c1.id);

    let mut table = SubmissionTable::default();
    table.record(k, SubmissionValue::Rating(5));
    table.record(k, SubmissionValue::Rating(5));

    let rows = table.all();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rating_value, Some(5));
}

#[test]
fn test_partial_ratings_use_only_raters_as_denominator() {
    let product = approved("Lantern");
    let c1 = Criterion::rating(Uuid::new_v4(), "Execution");
    let judges: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

    let mut table = SubmissionTable::default();
    table.record(key(judges[0], product.id, c1.id), SubmissionValue::Rating(5));
    table.record(key(judges[1], product.id, c1.id), SubmissionValue::Rating(3));
    // The remaining three judges only left comments on another criterion.
    let comments = Criterion::text(Uuid::new_v4(), "Comments");
    for judge in &judges[2..] {
        table.record(
            key(*judge, product.id, comments.id),
            SubmissionValue::Text("Needs polish".to_string()),
        );
    }

    let rows = table.all();
    let summary = summarize_product(product.id, &[c1.clone(), comments.clone()], &rows);
    assert_eq!(summary[0].count_judges, 2);
    assert_eq!(summary[0].avg_rating, Some(4.0));

    let board = compute_leaderboard(&[product], &[c1, comments], &rows);
    assert_eq!(board[0].judges_count, 5);
}

#[test]
fn test_unevaluated_product_is_not_ranked() {
    let judged = approved("Judged");
    let idle = approved("Idle");
    let c1 = Criterion::rating(Uuid::new_v4(), "Execution");

    let mut table = SubmissionTable::default();
    table.record(key(Uuid::new_v4(), judged.id, c1.id), SubmissionValue::Rating(3));

    let board = compute_leaderboard(&[judged.clone(), idle.clone()], &[c1], &table.all());
    assert!(board.iter().all(|entry| entry.product_id != idle.id));
    assert_eq!(board.len(), 1);
}

#[test]
fn test_status_notes_then_complete() {
    let saved = EvaluationState::transition(None, EvaluationState::Pending, Some("looks good"))
        .expect("saving notes succeeds");
    assert_eq!(saved.to, EvaluationState::InProgress);

    let done = EvaluationState::transition(Some(saved.to), EvaluationState::Completed, None)
        .expect("completing succeeds");
    assert_eq!(done.to, EvaluationState::Completed);

    // A later notes save cannot silently undo completion.
    assert!(
        EvaluationState::transition(Some(done.to), EvaluationState::Pending, Some("edit")).is_err()
    );
}

#[test]
fn test_leaderboard_to_certificate_and_csv() {
    let lantern = approved("Lantern");
    let compass = approved("Compass");
    let design = Criterion::rating(Uuid::new_v4(), "Design").with_weight(2.0);
    let impact = Criterion::rating(Uuid::new_v4(), "Impact");
    let criteria = vec![design.clone(), impact.clone()];
    let j1 = Uuid::new_v4();
    let j2 = Uuid::new_v4();

    let mut table = SubmissionTable::default();
    table.record(key(j1, lantern.id, design.id), SubmissionValue::Rating(5));
    table.record(key(j2, lantern.id, design.id), SubmissionValue::Rating(4));
    table.record(key(j1, lantern.id, impact.id), SubmissionValue::Rating(3));
    table.record(key(j1, compass.id, design.id), SubmissionValue::Rating(2));
    let rows = table.all();

    let board = compute_leaderboard(&[lantern.clone(), compass.clone()], &criteria, &rows);
    assert_eq!(board[0].product_id, lantern.id);
    assert_eq!(board[1].product_id, compass.id);
    assert_eq!(board[1].rank, 2);

    let summary = summarize_product(lantern.id, &criteria, &rows);
    // design 4.5/5 -> 9.0 (weight 2), impact 3/5 -> 6.0 (weight 1)
    assert_eq!(overall_score(&summary), 8.0);
    assert_eq!(board[0].total_score, 8.0);

    let doc = render_certificate(&CertificateInput {
        program_name: "Autumn Showcase".to_string(),
        completed_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        product: lantern.clone(),
        makers: vec![],
        criteria: criteria.clone(),
        summary,
        judges: vec![Person::default(), Person::default()],
        overall_score: board[0].total_score,
        verification_url: format!("https://showcase.example/certificates/{}", lantern.id),
    })
    .unwrap();

    assert!(!doc.has_section(SectionKind::Makers));
    assert!(doc.has_section(SectionKind::Grades));
    assert!(doc.has_section(SectionKind::Judges));
    assert_eq!(doc.payload.overall_score, 8.0);
    assert_eq!(doc.fingerprint().unwrap().len(), 64);

    let csv = leaderboard_csv(&board).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains(&format!("1,{},Lantern,8.0,80.0,4.0,2", lantern.id)));
}
