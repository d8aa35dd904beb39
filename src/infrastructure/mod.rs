//! Infrastructure layer
//!
//! This module contains all external dependencies and infrastructure
//! concerns: the Postgres pool, SQL predicate assembly, and the repository
//! that executes statements and maps rows back to entities.

pub mod db;
pub mod query;
pub mod repository;
