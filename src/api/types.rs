use serde::Serialize;

use crate::domain::FieldErrors;

/// Response envelope shared by every endpoint. `success` is `1` or `0`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: 1,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: 1,
            message: Some(message.into()),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: 1,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: 0,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn field_errors(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            success: 0,
            message: Some(message.into()),
            data: None,
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({"success": 1, "data": [1, 2]}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::field_errors(
            "Registration failed",
            FieldErrors::single("email", "Enter a valid email address."),
        ))
        .unwrap();
        assert_eq!(body["success"], 0);
        assert_eq!(body["message"], "Registration failed");
        assert_eq!(body["errors"]["email"][0], "Enter a valid email address.");
        assert!(body.get("data").is_none());
    }
}
