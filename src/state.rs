//! Application state management
//!
//! The state shared across all handlers. It is cheaply cloneable; the only
//! resource behind it is the Postgres connection pool inside the repository.

use std::sync::Arc;

use sqlx::PgPool;

use crate::infrastructure::repository::{PgSubscriptionRepository, SubscriptionRepository};
use crate::services::SubscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub service: SubscriptionService,
}

impl AppState {
    /// Production state: the Postgres repository bound to `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self::with_repository(Arc::new(PgSubscriptionRepository::new(pool)))
    }

    /// Bind any repository implementation. Integration tests use this to
    /// drive the full HTTP stack against an in-memory store.
    pub fn with_repository(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            service: SubscriptionService::new(repo),
        }
    }
}
