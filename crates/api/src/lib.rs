//! HTTP surface for the business-tier data-access service.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod shutdown;
