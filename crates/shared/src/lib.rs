//! Shared utilities and common types for the tax business backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Declarative camelCase/snake_case field mapping
//! - Page-based pagination helpers
//! - Common validation logic

pub mod field_map;
pub mod pagination;
pub mod validation;
