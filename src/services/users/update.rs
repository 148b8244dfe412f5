use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use super::create::user_write_failed;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::common::{
    bad_request, internal_error, invalidate_cached_users, not_found, validation_failed,
};
use crate::utils::password::hash_password;
use crate::utils::validate::ValidateRequest;

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update_data.username = update_data.username.map(|u| u.trim().to_string());
    update_data.email = update_data.email.map(|e| e.trim().to_lowercase());

    if let Err(msg) = update_data.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    if let Some(username) = &update_data.username {
        match storage.is_username_taken(username, Some(user_id)).await {
            Ok(true) => {
                return Ok(bad_request(
                    request,
                    ErrorCode::UserAlreadyExists,
                    "Username already exists",
                ));
            }
            Ok(false) => {}
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::UserUpdateFailed,
                    format!("Failed to update user information: {e}"),
                ));
            }
        }
    }

    if let Some(email) = &update_data.email {
        match storage.is_email_taken(email, Some(user_id)).await {
            Ok(true) => {
                return Ok(bad_request(
                    request,
                    ErrorCode::UserAlreadyExists,
                    "Email already exists",
                ));
            }
            Ok(false) => {}
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::UserUpdateFailed,
                    format!("Failed to update user information: {e}"),
                ));
            }
        }
    }

    if let Some(password) = &update_data.password {
        match hash_password(password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                ));
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok().json(
                ApiResponse::success(UserResponse { user }, "User information updated successfully")
                    .at(request),
            ))
        }
        Ok(None) => Ok(not_found(request, ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(user_write_failed(
            request,
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to update user information",
        )),
    }
}
