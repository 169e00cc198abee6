use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Uniform envelope wrapping every portfolio endpoint's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::<()>::failed("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "failed", "message": "boom"}));
    }

    #[test]
    fn test_success_envelope() {
        let body = serde_json::to_value(ApiResponse::success("ok", 300.0)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "message": "ok", "data": 300.0})
        );
    }
}
