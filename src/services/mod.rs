//! Service layer
//!
//! Orchestration between the HTTP surface and the repository. Today this is
//! a pure pass-through; it exists as the seam where cross-cutting concerns
//! would attach.

pub mod subscription_service;

pub use subscription_service::SubscriptionService;
