//! Persistence layer for the tax business data-access service.
//!
//! This crate contains:
//! - Database connection management and query metrics
//! - Entity definitions (snake_case row mappings shared by both backends)
//! - PostgreSQL repositories implementing the domain store traits
//! - An in-process store implementing the same traits for development and tests

pub mod db;
pub mod entities;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod repositories;
pub mod stores;

pub use error::PersistenceError;
pub use memory::MemoryStore;
pub use stores::Stores;
