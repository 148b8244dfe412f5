use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    pub path: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            path: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code as i32,
            message: message.into(),
            data: Some(data),
            path: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 标记响应对应的请求路径
    pub fn at(mut self, request: &HttpRequest) -> Self {
        self.path = request.path().to_string();
        self
    }

    /// 直接指定路径（中间件中没有 HttpRequest 时使用）
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            path: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code as i32,
            message: message.into(),
            data: None,
            path: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_envelope_shape() {
        let req = TestRequest::get().uri("/api/v1/users?page=2").to_http_request();
        let response = ApiResponse::success(vec![1, 2], "ok").at(&req);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["path"], "/api/v1/users");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_error_envelope_has_null_data() {
        let response = ApiResponse::error_empty(ErrorCode::NotFound, "missing").with_path("/x");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["code"], ErrorCode::NotFound as i32);
        assert!(json["data"].is_null());
        assert_eq!(json["path"], "/x");
    }
}
