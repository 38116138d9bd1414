use axum::extract::State;
use domain::models::{ApiResponse, ReferenceData};

use super::Envelope;
use crate::app::AppState;

/// `GET /reference-data`: regions, white-label packages and report categories
/// from configuration.
pub async fn get_reference_data(State(state): State<AppState>) -> Envelope<ReferenceData> {
    Envelope::ok(ApiResponse::ok(state.config.reference_data.clone()))
}
