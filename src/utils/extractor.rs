//! 路径参数提取器
//!
//! 非法或非正数的 ID 直接返回 400 响应信封，处理函数无需再校验。
//! 生成的类型既可以单独作为提取器，也可以放进 `web::Path<(A, B)>` 中使用。

use actix_web::error::InternalError;
use actix_web::{HttpRequest, HttpResponse};

use crate::models::{ApiResponse, ErrorCode};

/// 定义一个从路径参数中提取正整数 ID 的类型
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                futures_util::future::ready(
                    $crate::utils::extractor::parse_i64_param(req, $param).map($name),
                )
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = <i64 as serde::Deserialize>::deserialize(deserializer)?;
                if id > 0 {
                    Ok($name(id))
                } else {
                    Err(serde::de::Error::custom(format!(
                        "Invalid path parameter '{}': '{}'",
                        $param, id
                    )))
                }
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeRoleIdI64, "role_id");
define_safe_i64_extractor!(SafePermissionIdI64, "permission_id");
define_safe_i64_extractor!(SafeModuleIdI64, "module_id");
define_safe_i64_extractor!(SafeLessonIdI64, "lesson_id");

/// 读取并校验路径中的 ID 参数
pub fn parse_i64_param(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let response = HttpResponse::BadRequest().json(
                ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("Invalid path parameter '{name}': '{raw}'"),
                )
                .at(req),
            );
            Err(InternalError::from_response(format!("invalid {name}"), response).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::FromRequest;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id() {
        let (req, mut payload) = TestRequest::default()
            .param("id", "42")
            .to_http_parts();
        let id = SafeIDI64::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_invalid_id_is_bad_request() {
        for raw in ["abc", "0", "-3"] {
            let (req, mut payload) = TestRequest::default()
                .param("role_id", raw)
                .to_http_parts();
            let err = SafeRoleIdI64::from_request(&req, &mut payload)
                .await
                .unwrap_err();
            assert_eq!(
                err.as_response_error().status_code(),
                actix_web::http::StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        assert_eq!(serde_json::from_str::<SafeModuleIdI64>("7").unwrap().0, 7);
        assert!(serde_json::from_str::<SafeModuleIdI64>("0").is_err());
    }
}
