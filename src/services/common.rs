//! 各业务服务共用的依赖获取与响应构造

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use tracing::{error, warn};

use crate::cache::ObjectCache;
use crate::models::roles::entities::PERMISSION_DENIED_MESSAGE;
use crate::models::{ApiResponse, ErrorCode};
use crate::notifications::Mailer;
use crate::storage::Storage;

/// 取出通过 `web::Data<Arc<T>>` 注入的共享对象
pub(crate) fn shared<T: ?Sized + 'static>(
    request: &HttpRequest,
    what: &str,
) -> actix_web::Result<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("{} not found in app data", what);
            actix_web::error::ErrorInternalServerError(format!("{what} unavailable"))
        })
}

pub(crate) fn storage_from(request: &HttpRequest) -> actix_web::Result<Arc<dyn Storage>> {
    shared::<dyn Storage>(request, "Storage")
}

pub(crate) fn mailer_from(request: &HttpRequest) -> Option<Arc<Mailer>> {
    request
        .app_data::<web::Data<Arc<Mailer>>>()
        .map(|data| data.get_ref().clone())
}

/// 角色或权限变化后，清空已缓存的登录用户
pub(crate) async fn invalidate_cached_users(request: &HttpRequest) {
    match request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
        Some(cache) => cache.invalidate_all().await,
        None => warn!("Object cache not registered, cached users not invalidated"),
    }
}

pub(crate) fn validation_failed(request: &HttpRequest, message: impl Into<String>) -> HttpResponse {
    HttpResponse::UnprocessableEntity()
        .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message).at(request))
}

pub(crate) fn forbidden(request: &HttpRequest) -> HttpResponse {
    HttpResponse::Forbidden().json(
        ApiResponse::error_empty(ErrorCode::Forbidden, PERMISSION_DENIED_MESSAGE).at(request),
    )
}

pub(crate) fn unauthorized(request: &HttpRequest) -> HttpResponse {
    HttpResponse::Unauthorized().json(
        ApiResponse::error_empty(ErrorCode::Unauthorized, "Unauthorized access, please login")
            .at(request),
    )
}

pub(crate) fn not_found(
    request: &HttpRequest,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message).at(request))
}

pub(crate) fn bad_request(
    request: &HttpRequest,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message).at(request))
}

pub(crate) fn internal_error(
    request: &HttpRequest,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    let message = message.into();
    error!("{} {}: {}", request.method(), request.path(), message);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(code, message).at(request))
}

/// 当前用户是否持有管理员角色
pub(crate) fn is_admin(request: &HttpRequest) -> bool {
    crate::middlewares::RequireJWT::extract_user_claims(request).is_some_and(|user| user.is_admin())
}
