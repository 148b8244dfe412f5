use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PermissionService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, invalidate_cached_users, not_found};

pub async fn delete_permission(
    service: &PermissionService,
    permission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_permission(permission_id).await {
        Ok(true) => {
            // 授权记录一并删除，缓存中的用户权限随之失效
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Permission deleted successfully").at(request)))
        }
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::PermissionNotFound,
            "Permission not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Permission deletion failed: {e}"),
        )),
    }
}
