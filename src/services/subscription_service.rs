//! Subscription service façade
//!
//! Each method maps 1:1 onto a repository operation with no additional
//! business rules.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Error;
use crate::infrastructure::repository::SubscriptionRepository;
use crate::models::{
    CreateSubscriptionRequest, ListFilter, Subscription, SubscriptionSummary, SummaryQuery,
    UpdateSubscriptionRequest,
};

#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_subscription(
        &self,
        req: &CreateSubscriptionRequest,
    ) -> Result<Subscription, Error> {
        self.repo.create(req).await
    }

    pub async fn get_subscription(&self, id: Uuid) -> Result<Subscription, Error> {
        self.repo.get_by_id(id).await
    }

    pub async fn update_subscription(
        &self,
        id: Uuid,
        patch: &UpdateSubscriptionRequest,
    ) -> Result<(), Error> {
        self.repo.update(id, patch).await
    }

    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), Error> {
        self.repo.delete(id).await
    }

    pub async fn list_subscriptions(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<Subscription>, Error> {
        self.repo.list(filter).await
    }

    pub async fn get_summary(&self, query: &SummaryQuery) -> Result<SubscriptionSummary, Error> {
        self.repo.get_summary(query).await
    }
}
