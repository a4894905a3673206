//! Judge submissions: one row per (judge, product, criterion).
//!
//! A submission row is sparse. Each write names a single field and only
//! that field changes; the other fields keep whatever earlier writes put
//! there. `SubmissionRecord::apply` is the merge used for that, the store
//! performs the same merge with a single `ON CONFLICT` upsert.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScoringError;

/// Maximum length of a free-text answer in bytes.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Column of a submission row a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionField {
    RatingValue,
    BooleanValue,
    TextValue,
}

impl SubmissionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RatingValue => "rating_value",
            Self::BooleanValue => "boolean_value",
            Self::TextValue => "text_value",
        }
    }
}

impl fmt::Display for SubmissionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value for exactly one submission field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum SubmissionValue {
    #[serde(rename = "rating_value")]
    Rating(i32),
    #[serde(rename = "boolean_value")]
    Boolean(bool),
    #[serde(rename = "text_value")]
    Text(String),
}

impl SubmissionValue {
    /// The field this value writes to.
    pub fn field(&self) -> SubmissionField {
        match self {
            Self::Rating(_) => SubmissionField::RatingValue,
            Self::Boolean(_) => SubmissionField::BooleanValue,
            Self::Text(_) => SubmissionField::TextValue,
        }
    }

    /// Builds a value from an untyped JSON payload addressed at `field`.
    pub fn from_json(field: SubmissionField, value: &serde_json::Value) -> Result<Self, ScoringError> {
        match field {
            SubmissionField::RatingValue => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Rating)
                .ok_or_else(|| {
                    ScoringError::InvalidSubmission(format!(
                        "rating_value must be an integer, got {}",
                        value
                    ))
                }),
            SubmissionField::BooleanValue => value.as_bool().map(Self::Boolean).ok_or_else(|| {
                ScoringError::InvalidSubmission(format!(
                    "boolean_value must be true or false, got {}",
                    value
                ))
            }),
            SubmissionField::TextValue => {
                let text = value.as_str().ok_or_else(|| {
                    ScoringError::InvalidSubmission(format!(
                        "text_value must be a string, got {}",
                        value
                    ))
                })?;
                if text.len() > MAX_TEXT_LENGTH {
                    return Err(ScoringError::InvalidSubmission(format!(
                        "text_value must be {} bytes or less",
                        MAX_TEXT_LENGTH
                    )));
                }
                Ok(Self::Text(text.to_string()))
            }
        }
    }
}

/// Composite key of a submission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionKey {
    pub judge_id: Uuid,
    pub product_id: Uuid,
    pub criterion_id: Uuid,
}

/// The values a single judge recorded for one criterion of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SubmissionRecord {
    /// Unique identifier for this row.
    pub id: Uuid,
    /// Judge who recorded the values.
    pub judge_id: Uuid,
    /// Product being evaluated.
    pub product_id: Uuid,
    /// Criterion being answered.
    pub criterion_id: Uuid,
    pub rating_value: Option<i32>,
    pub boolean_value: Option<bool>,
    pub text_value: Option<String>,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When any field was last written.
    pub updated_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Creates a row with only `value`'s field populated.
    pub fn new(key: SubmissionKey, value: SubmissionValue, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            judge_id: key.judge_id,
            product_id: key.product_id,
            criterion_id: key.criterion_id,
            rating_value: None,
            boolean_value: None,
            text_value: None,
            created_at: now,
            updated_at: now,
        };
        record.apply(value, now);
        record
    }

    /// Writes one field in place and touches `updated_at`.
    ///
    /// Returns whether the stored value changed.
    pub fn apply(&mut self, value: SubmissionValue, now: DateTime<Utc>) -> bool {
        let changed = match value {
            SubmissionValue::Rating(v) => replace(&mut self.rating_value, v),
            SubmissionValue::Boolean(v) => replace(&mut self.boolean_value, v),
            SubmissionValue::Text(v) => replace(&mut self.text_value, v),
        };
        self.updated_at = now;
        changed
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        return false;
    }
    *slot = Some(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> SubmissionKey {
        SubmissionKey {
            judge_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            criterion_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_field_serialization() {
        assert_eq!(
            serde_json::to_string(&SubmissionField::RatingValue).unwrap(),
            "\"rating_value\""
        );
        assert_eq!(
            serde_json::from_str::<SubmissionField>("\"text_value\"").unwrap(),
            SubmissionField::TextValue
        );
    }

    #[test]
    fn test_value_tagged_serialization() {
        let json = serde_json::to_value(SubmissionValue::Boolean(true)).unwrap();
        assert_eq!(json, serde_json::json!({"field": "boolean_value", "value": true}));
    }

    #[test]
    fn test_new_record_is_sparse() {
        let record = SubmissionRecord::new(key(), SubmissionValue::Rating(4), Utc::now());
        assert_eq!(record.rating_value, Some(4));
        assert_eq!(record.boolean_value, None);
        assert_eq!(record.text_value, None);
    }

    #[test]
    fn test_apply_only_touches_named_field() {
        let now = Utc::now();
        let mut record = SubmissionRecord::new(key(), SubmissionValue::Rating(3), now);
        record.apply(SubmissionValue::Text("solid demo".to_string()), now);

        assert_eq!(record.rating_value, Some(3));
        assert_eq!(record.text_value.as_deref(), Some("solid demo"));
    }

    #[test]
    fn test_apply_same_value_is_noop_but_touches_updated_at() {
        let created = Utc::now();
        let later = created + Duration::minutes(5);
        let mut record = SubmissionRecord::new(key(), SubmissionValue::Rating(4), created);

        let changed = record.apply(SubmissionValue::Rating(4), later);

        assert!(!changed);
        assert_eq!(record.rating_value, Some(4));
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn test_apply_overwrites_boolean() {
        let now = Utc::now();
        let mut record = SubmissionRecord::new(key(), SubmissionValue::Boolean(true), now);
        assert!(record.apply(SubmissionValue::Boolean(false), now));
        assert_eq!(record.boolean_value, Some(false));
    }

    #[test]
    fn test_from_json_rating() {
        let value = SubmissionValue::from_json(SubmissionField::RatingValue, &serde_json::json!(4));
        assert_eq!(value.unwrap(), SubmissionValue::Rating(4));

        let err = SubmissionValue::from_json(SubmissionField::RatingValue, &serde_json::json!("4"));
        assert!(err.is_err());
    }

    #[test]
    fn test_from_json_rating_overflow() {
        let err = SubmissionValue::from_json(
            SubmissionField::RatingValue,
            &serde_json::json!(i64::from(i32::MAX) + 1),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_from_json_text_too_long() {
        let long = "x".repeat(MAX_TEXT_LENGTH + 1);
        let err = SubmissionValue::from_json(SubmissionField::TextValue, &serde_json::json!(long))
            .unwrap_err();
        assert!(err.to_string().contains("or less"));
    }
}
