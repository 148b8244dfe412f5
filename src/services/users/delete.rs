use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, invalidate_cached_users, not_found};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(bad_request(
            request,
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        ));
    }

    let storage = service.get_storage(request)?;

    match storage.delete_user(user_id).await {
        Ok(true) => {
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("User deleted successfully").at(request)))
        }
        Ok(false) => Ok(not_found(request, ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::UserDeleteFailed,
            format!("User deletion failed: {e}"),
        )),
    }
}
