//! Response envelope returned to the front end.
//!
//! Success is an empty error list. Callers must check `errors` rather than
//! look for a status field.

use serde::{Deserialize, Serialize};

use crate::error::ThunderError;

/// One failure entry in a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category (e.g., "Validation Error")
    pub title: String,
    /// Numeric status
    pub status: u16,
    /// Human-readable detail sourced from the originating error
    pub detail: String,
    /// Suggested next step, when the error has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&ThunderError> for ErrorResponse {
    fn from(err: &ThunderError) -> Self {
        Self {
            title: format!("{} Error", err.category()),
            status: err.status(),
            detail: err.to_string(),
            hint: err.hint().map(String::from),
        }
    }
}

/// Envelope for every facade operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    /// Successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self { errors: Vec::new(), data: Some(data) }
    }

    /// Failed response without data.
    pub fn error(err: &ThunderError) -> Self {
        Self { errors: vec![ErrorResponse::from(err)], data: None }
    }

    /// Failed response that still carries a payload (e.g., `connected: false`).
    pub fn error_with_data(err: &ThunderError, data: T) -> Self {
        Self { errors: vec![ErrorResponse::from(err)], data: Some(data) }
    }

    /// Wrap a result.
    pub fn from_result(result: Result<T, ThunderError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error detail, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|e| e.detail.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_omits_errors() {
        let json = serde_json::to_string(&Response::ok(vec!["users"])).unwrap();
        assert_eq!(json, r#"{"data":["users"]}"#);
    }

    #[test]
    fn test_error_carries_detail() {
        let response: Response<bool> = Response::from_result(Err(ThunderError::validation("table name is required")));

        assert!(!response.is_ok());
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].title, "Validation Error");
        assert_eq!(response.errors[0].status, 422);
        assert_eq!(response.first_error(), Some("Validation error: table name is required"));
    }

    #[test]
    fn test_error_with_data() {
        let response = Response::error_with_data(&ThunderError::NoActiveConnection, false);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!(false));
        assert_eq!(json["errors"][0]["status"], serde_json::json!(409));
        assert_eq!(json["errors"][0]["hint"], serde_json::json!("Connect to a database first"));
    }

    #[test]
    fn test_hint_omitted_when_absent() {
        let response: Response<bool> = Response::error(&ThunderError::validation("no data to insert"));
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["errors"][0].get("hint").is_none());

        let err = ThunderError::connection_with_hint("refused", "Check the port");
        let response: Response<bool> = Response::error(&err);
        assert_eq!(response.errors[0].hint.as_deref(), Some("Check the port"));
    }
}
