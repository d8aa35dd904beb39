//! Subscription persistence
//!
//! `SubscriptionRepository` is the single seam between the domain and the
//! store; `PgSubscriptionRepository` is its one concrete implementation,
//! bound at startup. Statement assembly lives in free functions so the
//! predicate composition can be tested without a database.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Error;
use crate::infrastructure::query::PredicateBuilder;
use crate::models::{
    CreateSubscriptionRequest, ListFilter, Subscription, SubscriptionSummary, SummaryQuery,
    UpdateSubscriptionRequest,
};

const SUBSCRIPTION_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

/// Storage operations for subscription records
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, req: &CreateSubscriptionRequest) -> Result<Subscription, Error>;
    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, Error>;
    async fn update(&self, id: Uuid, patch: &UpdateSubscriptionRequest) -> Result<(), Error>;
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Subscription>, Error>;
    async fn get_summary(&self, query: &SummaryQuery) -> Result<SubscriptionSummary, Error>;
}

/// Postgres-backed repository
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact-triple lookup used by the duplicate guard. Matches on equality
    /// of (user_id, service_name, start_date), not interval overlap.
    async fn find_by_triple(
        &self,
        user_id: Uuid,
        service_name: &str,
        start_date: chrono::NaiveDate,
    ) -> Result<Option<Subscription>, Error> {
        let existing = sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date, created_at, updated_at \
             FROM subscriptions \
             WHERE user_id = $1 AND service_name = $2 AND start_date = $3 \
             LIMIT 1",
        )
        .bind(user_id)
        .bind(service_name)
        .bind(start_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(existing)
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, req: &CreateSubscriptionRequest) -> Result<Subscription, Error> {
        // Duplicate guard: cheap pre-check for the common case. The UNIQUE
        // constraint remains the authoritative guard against a concurrent
        // insert racing past this check; that path surfaces through the
        // sqlx error normalization as the same Conflict outcome.
        if self
            .find_by_triple(req.user_id, &req.service_name, req.start_date)
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "subscription already exists for user {} to service {} starting from {}",
                req.user_id, req.service_name, req.start_date
            )));
        }

        let sub = sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, service_name, price, user_id, start_date, end_date, created_at, updated_at",
        )
        .bind(&req.service_name)
        .bind(req.price)
        .bind(req.user_id)
        .bind(req.start_date)
        .bind(req.end_date)
        .fetch_one(&self.pool)
        .await?;

        info!(id = %sub.id, "created subscription");
        Ok(sub)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, Error> {
        let sub = sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date, created_at, updated_at \
             FROM subscriptions \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        sub.ok_or_else(|| Error::not_found("subscription not found"))
    }

    async fn update(&self, id: Uuid, patch: &UpdateSubscriptionRequest) -> Result<(), Error> {
        let mut statement = update_statement(id, patch);
        let result = statement.build().execute(&self.pool).await?;

        // The statement predicates on id alone, so zero affected rows is
        // the only existence signal.
        if result.rows_affected() == 0 {
            return Err(Error::not_found("subscription not found"));
        }

        info!(id = %id, "updated subscription");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("subscription not found"));
        }

        info!(id = %id, "deleted subscription");
        Ok(())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Subscription>, Error> {
        let mut statement = list_statement(filter);
        let subscriptions = statement
            .builder()
            .build_query_as::<Subscription>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = subscriptions.len(), "listed subscriptions");
        Ok(subscriptions)
    }

    async fn get_summary(&self, query: &SummaryQuery) -> Result<SubscriptionSummary, Error> {
        let mut total_statement =
            summary_statement("SELECT COALESCE(SUM(price), 0) FROM subscriptions", query);
        let total_cost: Decimal = total_statement
            .builder()
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // Same predicate set as the SUM, same ordering contract as list.
        let mut rows_statement = summary_statement(
            &format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions"),
            query,
        );
        rows_statement.raw(" ORDER BY created_at DESC");
        let subscriptions = rows_statement
            .builder()
            .build_query_as::<Subscription>()
            .fetch_all(&self.pool)
            .await?;

        debug!(total_cost = %total_cost, matches = subscriptions.len(), "calculated summary");
        Ok(SubscriptionSummary {
            total_cost,
            subscriptions: Some(subscriptions),
        })
    }
}

/// `SELECT ... [WHERE ...] ORDER BY created_at DESC` for the list operation.
///
/// Predicate order is fixed: user_id, then service_name. The descending
/// creation-time ordering is part of the operation's contract.
fn list_statement(filter: &ListFilter) -> PredicateBuilder<'static> {
    let mut builder =
        PredicateBuilder::new(format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions"));

    if let Some(user_id) = filter.user_id {
        builder.predicate("user_id = ", user_id, "");
    }
    if let Some(service_name) = &filter.service_name {
        builder.predicate("service_name = ", service_name.clone(), "");
    }
    builder.raw(" ORDER BY created_at DESC");
    builder
}

/// Appends the summary predicates to `base` in a fixed order: date window,
/// then user_id, then service_name.
///
/// A subscription qualifies when its active interval [start_date, end_date]
/// overlaps the query window, bounds inclusive; an absent end_date means the
/// subscription is open-ended and only the window start can exclude it.
fn summary_statement(base: &str, query: &SummaryQuery) -> PredicateBuilder<'static> {
    let mut builder = PredicateBuilder::new(base);

    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            builder.predicate("start_date <= ", end, "");
            builder.predicate("(end_date IS NULL OR end_date >= ", start, ")");
        }
        (Some(start), None) => {
            builder.predicate("(end_date IS NULL OR end_date >= ", start, ")");
        }
        (None, Some(end)) => {
            builder.predicate("start_date <= ", end, "");
        }
        (None, None) => {}
    }

    if let Some(user_id) = query.user_id {
        builder.predicate("user_id = ", user_id, "");
    }
    if let Some(service_name) = &query.service_name {
        builder.predicate("service_name = ", service_name.clone(), "");
    }
    builder
}

/// `UPDATE` statement applying only the present patch fields; `updated_at`
/// is always refreshed, even for an empty patch.
fn update_statement(
    id: Uuid,
    patch: &UpdateSubscriptionRequest,
) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new("UPDATE subscriptions SET updated_at = NOW()");

    if let Some(service_name) = &patch.service_name {
        builder.push(", service_name = ");
        builder.push_bind(service_name.clone());
    }
    if let Some(price) = patch.price {
        builder.push(", price = ");
        builder.push_bind(price);
    }
    match patch.end_date {
        Some(Some(end_date)) => {
            builder.push(", end_date = ");
            builder.push_bind(end_date);
        }
        // Explicit null: clear the end date, the subscription is open-ended
        // again. Distinct from an absent field, which leaves it untouched.
        Some(None) => {
            builder.push(", end_date = NULL");
        }
        None => {}
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder
}
