//! Subscription Service Library
//!
//! This library provides all the core functionality for the subscription
//! service. It can be used independently of the main binary for testing or
//! integration into other applications.

pub mod config;
pub mod error;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use error::Error;
pub use handlers::create_router;
pub use models::*;
pub use state::AppState;
