//! Domain models and data structures
//!
//! This module contains all the core data types used throughout the
//! application. These are "pure" data structures without business logic,
//! except for boundary validation of inbound requests.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// A user subscription record
///
/// `id`, `created_at` and `updated_at` are assigned by the store and are
/// authoritative over anything a client supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: Decimal,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription creation request from clients
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub service_name: String,
    pub price: Decimal,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl CreateSubscriptionRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.service_name.trim().is_empty() {
            return Err(Error::validation("service_name must not be empty"));
        }
        if self.price <= Decimal::ZERO {
            return Err(Error::validation("price must be greater than zero"));
        }
        Ok(())
    }
}

/// Sparse patch for an existing subscription
///
/// Every field is optional; an absent field leaves the stored value
/// untouched. `end_date` is doubly optional so that an explicit JSON `null`
/// (clear the end date, the subscription becomes open-ended again) can be
/// told apart from the field not being present at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub service_name: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

impl UpdateSubscriptionRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.service_name {
            if name.trim().is_empty() {
                return Err(Error::validation("service_name must not be empty"));
            }
        }
        if let Some(price) = self.price {
            if price <= Decimal::ZERO {
                return Err(Error::validation("price must be greater than zero"));
            }
        }
        Ok(())
    }
}

/// Wraps a deserialized value in a second `Option` so a present-but-null
/// field becomes `Some(None)` while a missing field stays `None` via
/// `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional conjunctive filters for listing subscriptions
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

/// Filters for the cost summary query
///
/// The date window selects subscriptions whose active interval overlaps
/// `[start_date, end_date]`; either bound may be absent.
#[derive(Debug, Clone, Default)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

/// Total cost over the matching subscriptions, plus the matches themselves
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSummary {
    pub total_cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<Subscription>>,
}

/// Confirmation body for update/delete responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create() -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            service_name: "Netflix".to_string(),
            price: Decimal::new(999, 2),
            user_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn create_request_accepts_valid_input() {
        assert!(base_create().validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_service_name() {
        let mut req = base_create();
        req.service_name = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_non_positive_price() {
        let mut req = base_create();
        req.price = Decimal::ZERO;
        assert!(req.validate().is_err());
        req.price = Decimal::new(-100, 2);
        assert!(req.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let absent: UpdateSubscriptionRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.end_date, None);

        let cleared: UpdateSubscriptionRequest =
            serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(cleared.end_date, Some(None));

        let set: UpdateSubscriptionRequest =
            serde_json::from_str(r#"{"end_date": "2024-06-30"}"#).unwrap();
        assert_eq!(
            set.end_date,
            Some(Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()))
        );
    }

    #[test]
    fn patch_rejects_present_but_invalid_fields() {
        let patch: UpdateSubscriptionRequest =
            serde_json::from_str(r#"{"service_name": ""}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: UpdateSubscriptionRequest = serde_json::from_str(r#"{"price": 0}"#).unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(UpdateSubscriptionRequest::default().validate().is_ok());
    }

    #[test]
    fn subscription_serializes_dates_as_iso() {
        let sub = Subscription {
            id: Uuid::nil(),
            service_name: "Spotify".to_string(),
            price: Decimal::new(499, 2),
            user_id: Uuid::nil(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["start_date"], "2024-03-15");
        assert!(json.get("end_date").is_none());
    }
}
