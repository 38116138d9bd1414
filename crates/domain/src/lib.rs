//! Domain layer for the tax business data-access service.
//!
//! This crate contains:
//! - Application models in their camelCase API shape, and the response envelope
//! - Datastore port traits implemented by `persistence`
//! - The data-access services and the best-effort audit dispatcher

pub mod models;
pub mod services;
pub mod store;
