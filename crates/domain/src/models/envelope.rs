//! The uniform response envelope returned by every data-access operation.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Category of a failed operation.
///
/// Not serialized; the HTTP layer uses it to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Invalid,
    Conflict,
    Unavailable,
    Internal,
}

impl From<&StoreError> for FailureKind {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => FailureKind::NotFound,
            StoreError::Invalid(_) => FailureKind::Invalid,
            StoreError::Conflict(_) => FailureKind::Conflict,
            StoreError::Unavailable(_) => FailureKind::Unavailable,
            StoreError::Database(_) => FailureKind::Internal,
        }
    }
}

/// `{data, error, success}`.
///
/// On success `data` is set and `error` is null. On failure `data` is null
/// (an empty list for list operations) and `error` holds a readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub success: bool,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            failure: None,
        }
    }

    pub fn fail(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
            success: false,
            failure: Some(kind),
        }
    }

    /// Convert a store result into an envelope.
    ///
    /// The error text is the store error's message, or `fallback` when that
    /// message is empty.
    pub fn from_result(result: Result<T, StoreError>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                tracing::warn!(error = %err, "{}", fallback);
                Self::fail(FailureKind::from(&err), error_message(&err, fallback))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: self.data.map(f),
            error: self.error,
            success: self.success,
            failure: self.failure,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Failure envelope for list operations: `data` is an empty list.
    pub fn fail_list(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            data: Some(Vec::new()),
            error: Some(message.into()),
            success: false,
            failure: Some(kind),
        }
    }

    pub fn from_list_result(result: Result<Vec<T>, StoreError>, fallback: &str) -> Self {
        match result {
            Ok(items) => Self::ok(items),
            Err(err) => {
                tracing::warn!(error = %err, "{}", fallback);
                Self::fail_list(FailureKind::from(&err), error_message(&err, fallback))
            }
        }
    }
}

fn error_message(err: &StoreError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let resp = ApiResponse::ok(json!({"id": 1}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({"data": {"id": 1}, "error": null, "success": true}));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let resp: ApiResponse<String> =
            ApiResponse::from_result(Err(StoreError::not_found("Integration")), "Failed to load integration");
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error.as_deref(), Some("Integration not found"));
        assert_eq!(resp.failure, Some(FailureKind::NotFound));

        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["data"], serde_json::Value::Null);
        assert!(value.get("failure").is_none());
    }

    #[test]
    fn test_list_failure_has_empty_data() {
        let resp: ApiResponse<Vec<u32>> = ApiResponse::from_list_result(
            Err(StoreError::Database("connection reset".into())),
            "Failed to load integrations",
        );
        assert_eq!(resp.data, Some(vec![]));
        assert_eq!(resp.error.as_deref(), Some("connection reset"));
        assert_eq!(resp.failure, Some(FailureKind::Internal));
    }

    #[test]
    fn test_empty_message_uses_fallback() {
        let resp: ApiResponse<()> =
            ApiResponse::from_result(Err(StoreError::Database(String::new())), "Failed to create ticket");
        assert_eq!(resp.error.as_deref(), Some("Failed to create ticket"));
    }

    #[test]
    fn test_map_preserves_failure() {
        let resp: ApiResponse<u32> = ApiResponse::fail(FailureKind::Conflict, "taken");
        let mapped = resp.map(|n| n + 1);
        assert!(!mapped.success);
        assert_eq!(mapped.failure, Some(FailureKind::Conflict));
        assert_eq!(mapped.error.as_deref(), Some("taken"));
    }
}
