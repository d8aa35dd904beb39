//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers and the router that
//! wires them up. Each handler extracts and validates request data, calls
//! the service, and lets the error taxonomy drive the response status.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::error::Error;
use crate::models::{
    CreateSubscriptionRequest, ListFilter, MessageResponse, Subscription, SubscriptionSummary,
    SummaryQuery, UpdateSubscriptionRequest,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/summary", get(get_summary))
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Create a new subscription
///
/// Returns 201 with the stored entity; id and timestamps come from the
/// store. A duplicate (user, service, start_date) triple yields 409.
async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), Error> {
    let Json(req) = payload.map_err(bad_body)?;
    req.validate()?;

    let subscription = state.service.create_subscription(&req).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Subscription>, Error> {
    let subscription = state.service.get_subscription(id).await?;
    Ok(Json(subscription))
}

/// Apply a sparse patch to a subscription
///
/// Only fields present in the body are changed; `"end_date": null` clears
/// the end date. `updated_at` is refreshed even for an empty patch.
async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, Error> {
    let Json(patch) = payload.map_err(bad_body)?;
    patch.validate()?;

    state.service.update_subscription(id, &patch).await?;
    Ok(Json(MessageResponse::new(
        "subscription updated successfully",
    )))
}

async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, Error> {
    state.service.delete_subscription(id).await?;
    Ok(Json(MessageResponse::new(
        "subscription deleted successfully",
    )))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    user_id: Option<String>,
    service_name: Option<String>,
}

/// List subscriptions, newest first, optionally filtered by user and
/// service.
async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Subscription>>, Error> {
    let filter = ListFilter {
        user_id: parse_uuid_param("user_id", params.user_id)?,
        service_name: non_empty(params.service_name),
    };

    let subscriptions = state.service.list_subscriptions(&filter).await?;
    Ok(Json(subscriptions))
}

#[derive(Debug, Default, Deserialize)]
struct SummaryParams {
    start_date: Option<String>,
    end_date: Option<String>,
    user_id: Option<String>,
    service_name: Option<String>,
}

/// Total cost of subscriptions whose active interval overlaps the query
/// window; all filters optional. Dates are `YYYY-MM-DD`.
async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SubscriptionSummary>, Error> {
    let query = SummaryQuery {
        start_date: parse_date_param("start_date", params.start_date)?,
        end_date: parse_date_param("end_date", params.end_date)?,
        user_id: parse_uuid_param("user_id", params.user_id)?,
        service_name: non_empty(params.service_name),
    };

    let summary = state.service.get_summary(&query).await?;
    Ok(Json(summary))
}

fn bad_body(rejection: JsonRejection) -> Error {
    warn!(error = %rejection, "invalid request body");
    Error::validation(format!("invalid request body: {rejection}"))
}

/// Empty query values are treated as absent filters.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_date_param(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, Error> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| Error::validation(format!("invalid {field} format, use YYYY-MM-DD")))
        })
        .transpose()
}

fn parse_uuid_param(field: &str, value: Option<String>) -> Result<Option<Uuid>, Error> {
    non_empty(value)
        .map(|v| Uuid::parse_str(&v).map_err(|_| Error::validation(format!("invalid {field}"))))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_values_are_absent() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn date_params_require_iso_format() {
        let parsed = parse_date_param("start_date", Some("2024-01-10".to_string())).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 1, 10));

        assert!(parse_date_param("start_date", Some("10.01.2024".to_string())).is_err());
        assert!(parse_date_param("start_date", Some("2024-13-01".to_string())).is_err());
        assert_eq!(parse_date_param("start_date", None).unwrap(), None);
    }

    #[test]
    fn uuid_params_reject_garbage() {
        assert!(parse_uuid_param("user_id", Some("not-a-uuid".to_string())).is_err());
        let id = Uuid::new_v4();
        assert_eq!(
            parse_uuid_param("user_id", Some(id.to_string())).unwrap(),
            Some(id)
        );
    }
}
