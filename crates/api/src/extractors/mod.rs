//! Custom Axum extractors.

pub mod envelope;

pub use envelope::{JsonBody, PathParam, QueryParams, UserQuery};
