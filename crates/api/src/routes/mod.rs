//! HTTP routes over the data-access services.
//!
//! Every handler returns the service envelope unchanged as the body; only the
//! status code is derived from it.

pub mod account_managers;
pub mod audit_logs;
pub mod compliance;
pub mod health;
pub mod integrations;
pub mod reference_data;
pub mod support;
pub mod system_metrics;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{ApiResponse, FailureKind};
use serde::Serialize;

/// A service envelope paired with the status to use on success.
#[derive(Debug)]
pub struct Envelope<T> {
    success_status: StatusCode,
    body: ApiResponse<T>,
}

impl<T> Envelope<T> {
    /// 200 on success.
    pub fn ok(body: ApiResponse<T>) -> Self {
        Self {
            success_status: StatusCode::OK,
            body,
        }
    }

    /// 201 on success.
    pub fn created(body: ApiResponse<T>) -> Self {
        Self {
            success_status: StatusCode::CREATED,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.body.failure {
            None => self.success_status,
            Some(kind) => failure_status(kind),
        }
    }
}

pub fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Invalid => StatusCode::BAD_REQUEST,
        FailureKind::Conflict => StatusCode::CONFLICT,
        FailureKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body)).into_response()
    }
}
