use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_domain::School;
use campus_service::SchoolError;
use serde::Serialize;
use serde_json::json;

/// 列表响应：GET /api/schools 与搜索共用
#[derive(Debug, Serialize)]
pub struct SchoolListResponse {
    pub success: bool,
    pub data: Vec<School>,
    pub count: usize,
}

impl SchoolListResponse {
    pub fn new(data: Vec<School>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count,
        }
    }
}

/// 单条记录响应，message只在写操作时出现
#[derive(Debug, Serialize)]
pub struct SchoolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: School,
}

/// 无数据响应（删除）
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// 统一错误响应：`{success:false, message, error?}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }
}

impl From<SchoolError> for ApiError {
    fn from(err: SchoolError) -> Self {
        match err {
            SchoolError::Validation(message) => Self {
                status: StatusCode::BAD_REQUEST,
                message,
                detail: None,
            },
            SchoolError::DuplicateEmail => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Email already exists".to_string(),
                detail: None,
            },
            SchoolError::NotFound => Self {
                status: StatusCode::NOT_FOUND,
                message: "School not found".to_string(),
                detail: None,
            },
            SchoolError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                    detail: Some(detail),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
        });
        if let Some(detail) = self.detail {
            body["error"] = json!(detail);
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from(SchoolError::Validation("All fields are required".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "All fields are required");
        assert!(err.detail.is_none());
    }

    #[test]
    fn test_duplicate_email_maps_to_400() {
        let err = ApiError::from(SchoolError::DuplicateEmail);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email already exists");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(SchoolError::NotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "School not found");
    }

    #[test]
    fn test_internal_maps_to_500_with_detail() {
        let err = ApiError::from(SchoolError::Internal("db gone".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
        assert_eq!(err.detail.as_deref(), Some("db gone"));
    }
}
