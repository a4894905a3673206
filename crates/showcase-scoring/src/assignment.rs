//! Judge-to-product assignments.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScoringError;
use crate::types::Product;

/// Links a judge to a product they must evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Assignment {
    pub id: Uuid,
    pub judge_id: Uuid,
    pub product_id: Uuid,
    /// Admin who made the assignment.
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

/// Which assignment set an "unassigned products" listing excludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnassignedScope {
    /// Products this judge has not been given yet.
    Judge(Uuid),
    /// Products no judge has been given yet.
    Global,
}

impl UnassignedScope {
    pub fn from_judge(judge_id: Option<Uuid>) -> Self {
        judge_id.map_or(Self::Global, Self::Judge)
    }
}

/// Validates an assignment request and returns the product ids to insert.
///
/// `catalog` must contain every requested product that exists; `already_assigned`
/// holds the ids the judge is already assigned to. Duplicate ids in the
/// request collapse to one, the first occurrence fixes the order.
pub fn plan_assignments(
    requested: &[Uuid],
    catalog: &[Product],
    already_assigned: &HashSet<Uuid>,
) -> Result<Vec<Uuid>, ScoringError> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if ids.is_empty() {
        return Err(ScoringError::EmptySelection);
    }

    let by_id: HashMap<Uuid, &Product> = catalog.iter().map(|p| (p.id, p)).collect();

    for id in &ids {
        let product = by_id
            .get(id)
            .ok_or(ScoringError::ProductNotFound(*id))?;
        if !product.status.is_assignable() {
            return Err(ScoringError::NotAssignable {
                id: *id,
                status: product.status,
            });
        }
    }

    let duplicates: Vec<Uuid> = ids
        .iter()
        .copied()
        .filter(|id| already_assigned.contains(id))
        .collect();
    if !duplicates.is_empty() {
        return Err(ScoringError::AlreadyAssigned(duplicates));
    }

    Ok(ids)
}

/// Approved products that are not in `assigned`, in catalog order.
///
/// The caller decides what `assigned` means: the judge's own assignments for
/// [`UnassignedScope::Judge`], everybody's for [`UnassignedScope::Global`].
pub fn unassigned_products(catalog: &[Product], assigned: &HashSet<Uuid>) -> Vec<Product> {
    catalog
        .iter()
        .filter(|p| p.is_approved() && !assigned.contains(&p.id))
        .cloned()
        .collect()
}
