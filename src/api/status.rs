use serde::Deserialize;

use crate::error::ApiError;

/// Pass/fail envelope returned by write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiStatus {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success") || self.status.eq_ignore_ascii_case("ok")
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                self.error.unwrap_or_else(|| format!("status `{}`", self.status)),
            ))
        }
    }
}

/// Interpret the body of a successful write response. An empty body counts
/// as success.
pub fn parse_status(body: &str) -> Result<(), ApiError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<ApiStatus>(body) {
        Ok(status) => status.into_result(),
        Err(_) => Err(ApiError::Rejected(format!("unexpected response: {body}"))),
    }
}
