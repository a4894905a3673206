//! Core domain types for the judging pipeline.
//!
//! Products and criteria are owned by the admin surface; the judging
//! pipeline only reads them. Everything here is plain data so it can be
//! shared by the aggregation engine, the certificate renderer and the
//! HTTP layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScoringError;
use crate::submission::{SubmissionField, SubmissionValue};

/// Default upper bound of the rating scale.
pub const DEFAULT_MAX_RATING: i32 = 5;

/// Smallest rating scale an admin may configure.
pub const MIN_RATING_SCALE: i32 = 2;

/// Largest rating scale an admin may configure.
pub const MAX_RATING_SCALE: i32 = 10;

/// Lifecycle state of a submitted product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "product_status", rename_all = "lowercase")
)]
pub enum ProductStatus {
    /// Still being edited by its makers.
    Draft,
    /// Waiting for admin review.
    Pending,
    /// Published and eligible for judging.
    Approved,
    /// Refused by an admin.
    Rejected,
}

impl ProductStatus {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Only approved products can be handed to judges.
    pub fn is_assignable(&self) -> bool {
        *self == Self::Approved
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product entered into the showcase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier for this product.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// One-line pitch.
    pub tagline: Option<String>,
    /// Current lifecycle status.
    pub status: ProductStatus,
    /// Hero image shown on the leaderboard and certificate.
    pub image_url: Option<String>,
}

impl Product {
    pub fn is_approved(&self) -> bool {
        self.status == ProductStatus::Approved
    }
}

/// Kind of input a criterion collects from judges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "criterion_type", rename_all = "lowercase")
)]
pub enum CriterionType {
    /// Numeric rating in `[1, max_value]`.
    Rating,
    /// Yes/no answer.
    Boolean,
    /// Free-text comment.
    Text,
}

impl CriterionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }

    /// The single submission column a criterion of this type writes to.
    pub fn field(&self) -> SubmissionField {
        match self {
            Self::Rating => SubmissionField::RatingValue,
            Self::Boolean => SubmissionField::BooleanValue,
            Self::Text => SubmissionField::TextValue,
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admin-defined evaluation dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Criterion {
    /// Unique identifier for this criterion.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Guidance shown to judges.
    pub description: Option<String>,
    /// What kind of input the criterion collects.
    #[serde(rename = "type")]
    pub criterion_type: CriterionType,
    /// Relative weight in the overall score (rating criteria only).
    pub weight: f64,
    /// Upper bound of the rating scale.
    pub max_value: i32,
}

impl Criterion {
    /// Create a rating criterion on the default 1..=5 scale with weight 1.
    pub fn rating(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            criterion_type: CriterionType::Rating,
            weight: 1.0,
            max_value: DEFAULT_MAX_RATING,
        }
    }

    /// Create a yes/no criterion.
    pub fn boolean(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            criterion_type: CriterionType::Boolean,
            ..Self::rating(id, name)
        }
    }

    /// Create a free-text criterion.
    pub fn text(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            criterion_type: CriterionType::Text,
            ..Self::rating(id, name)
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_max_value(mut self, max_value: i32) -> Self {
        self.max_value = max_value;
        self
    }

    pub fn is_rating(&self) -> bool {
        self.criterion_type == CriterionType::Rating
    }

    /// Checks the admin-supplied configuration.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ScoringError::InvalidCriterion(
                "Criterion name cannot be empty".to_string(),
            ));
        }
        if name.len() > 200 {
            return Err(ScoringError::InvalidCriterion(
                "Criterion name must be 200 characters or less".to_string(),
            ));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ScoringError::InvalidCriterion(format!(
                "Weight must be a non-negative number, got {}",
                self.weight
            )));
        }
        if self.is_rating() && !(MIN_RATING_SCALE..=MAX_RATING_SCALE).contains(&self.max_value) {
            return Err(ScoringError::InvalidCriterion(format!(
                "Rating scale must be between {} and {}, got {}",
                MIN_RATING_SCALE, MAX_RATING_SCALE, self.max_value
            )));
        }
        Ok(())
    }

    /// Checks that a judge's value fits this criterion.
    ///
    /// The value must target the column that matches the criterion type and
    /// ratings must lie in `[1, max_value]`.
    pub fn validate_value(&self, value: &SubmissionValue) -> Result<(), ScoringError> {
        let expected = self.criterion_type.field();
        if value.field() != expected {
            return Err(ScoringError::InvalidSubmission(format!(
                "Criterion '{}' is a {} criterion and expects '{}', got '{}'",
                self.name,
                self.criterion_type,
                expected.as_str(),
                value.field().as_str()
            )));
        }
        if let SubmissionValue::Rating(rating) = value {
            if *rating < 1 || *rating > self.max_value {
                return Err(ScoringError::InvalidSubmission(format!(
                    "Rating {} is outside the allowed range 1..={}",
                    rating, self.max_value
                )));
            }
        }
        Ok(())
    }
}

/// Capability held by a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "app_role", rename_all = "lowercase"))]
pub enum Role {
    Admin,
    Judge,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Judge => "judge",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public identity of a maker or judge as printed on certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Person {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

impl Person {
    /// External profile links that are present, as `(label, url)` pairs.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Twitter", self.twitter.as_deref()),
            ("LinkedIn", self.linkedin.as_deref()),
            ("GitHub", self.github.as_deref()),
            ("Website", self.website.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, url)| match url.map(str::trim) {
            Some(url) if !url.is_empty() => Some((label, url)),
            _ => None,
        })
        .collect()
    }

    /// Display name, or `fallback` when the profile has none.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            serde_json::from_str::<ProductStatus>("\"draft\"").unwrap(),
            ProductStatus::Draft
        );
    }

    #[test]
    fn test_only_approved_is_assignable() {
        assert!(ProductStatus::Approved.is_assignable());
        assert!(!ProductStatus::Draft.is_assignable());
        assert!(!ProductStatus::Pending.is_assignable());
        assert!(!ProductStatus::Rejected.is_assignable());
    }

    #[test]
    fn test_criterion_type_maps_to_one_field() {
        assert_eq!(CriterionType::Rating.field(), SubmissionField::RatingValue);
        assert_eq!(CriterionType::Boolean.field(), SubmissionField::BooleanValue);
        assert_eq!(CriterionType::Text.field(), SubmissionField::TextValue);
    }

    #[test]
    fn test_criterion_serializes_type_key() {
        let criterion = Criterion::boolean(Uuid::new_v4(), "Works offline");
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["type"], "boolean");
        assert_eq!(json["maxValue"], 5);
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let criterion = Criterion::rating(Uuid::new_v4(), "Design").with_weight(-1.0);
        let err = criterion.validate().unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_validate_rejects_scale_out_of_range() {
        let criterion = Criterion::rating(Uuid::new_v4(), "Design").with_max_value(11);
        assert!(criterion.validate().is_err());

        let criterion = Criterion::rating(Uuid::new_v4(), "Design").with_max_value(10);
        assert!(criterion.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let criterion = Criterion::text(Uuid::new_v4(), "   ");
        assert!(criterion.validate().unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_value_bounds() {
        let criterion = Criterion::rating(Uuid::new_v4(), "Impact");
        assert!(criterion.validate_value(&SubmissionValue::Rating(1)).is_ok());
        assert!(criterion.validate_value(&SubmissionValue::Rating(5)).is_ok());
        assert!(criterion.validate_value(&SubmissionValue::Rating(0)).is_err());
        assert!(criterion.validate_value(&SubmissionValue::Rating(6)).is_err());
    }

    #[test]
    fn test_validate_value_wrong_field() {
        let criterion = Criterion::rating(Uuid::new_v4(), "Impact");
        let err = criterion
            .validate_value(&SubmissionValue::Boolean(true))
            .unwrap_err();
        assert!(err.to_string().contains("expects 'rating_value'"));
    }

    #[test]
    fn test_person_links_skip_blank() {
        let person = Person {
            github: Some("https://github.com/ada".to_string()),
            twitter: Some("  ".to_string()),
            ..Person::default()
        };
        assert_eq!(person.links(), vec![("GitHub", "https://github.com/ada")]);
    }

    #[test]
    fn test_person_display_name_fallback() {
        let person = Person::default();
        assert_eq!(person.display_name("Unknown Maker"), "Unknown Maker");

        let person = Person {
            full_name: Some("Ada Lovelace".to_string()),
            ..Person::default()
        };
        assert_eq!(person.display_name("Unknown Maker"), "Ada Lovelace");
    }
}
