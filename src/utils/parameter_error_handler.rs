use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

/// 去掉 serde_json 附带的位置信息
fn clean_serde_message(message: &str) -> &str {
    message
        .split(" at line ")
        .next()
        .unwrap_or(message)
        .trim()
}

/// JSON 请求体错误处理：反序列化失败返回 422
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON payload error on {}: {}", req.path(), err);

    let response = match &err {
        JsonPayloadError::Deserialize(e) => HttpResponse::UnprocessableEntity().json(
            ApiResponse::error_empty(
                ErrorCode::ValidationFailed,
                clean_serde_message(&e.to_string()),
            )
            .at(req),
        ),
        JsonPayloadError::ContentType => HttpResponse::UnsupportedMediaType().json(
            ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Content-Type must be application/json",
            )
            .at(req),
        ),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            HttpResponse::PayloadTooLarge().json(
                ApiResponse::error_empty(ErrorCode::BadRequest, "Request body is too large")
                    .at(req),
            )
        }
        _ => HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::BadRequest, format!("Invalid request body: {err}"))
                .at(req),
        ),
    };

    InternalError::from_response(err, response).into()
}

/// 查询参数错误处理：统一返回 422
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query error on {}: {}", req.path(), err);

    let message = match &err {
        QueryPayloadError::Deserialize(e) => format!("Invalid query parameters: {e}"),
        _ => format!("Invalid query parameters: {err}"),
    };

    let response = HttpResponse::UnprocessableEntity()
        .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message).at(req));

    InternalError::from_response(err, response).into()
}

/// 路径参数错误处理：`web::Path<(A, B)>` 反序列化失败返回 400
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("Path error on {}: {}", req.path(), err);

    let message = match &err {
        PathError::Deserialize(e) => e.to_string(),
        _ => err.to_string(),
    };

    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, message).at(req));

    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_serde_message() {
        assert_eq!(
            clean_serde_message("missing field `email` at line 1 column 20"),
            "missing field `email`"
        );
        assert_eq!(clean_serde_message("plain"), "plain");
    }
}
