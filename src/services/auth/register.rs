use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::users::requests::CreateUserRequest;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::notifications::templates::welcome_email;
use crate::services::common::mailer_from;
use crate::services::users::create::{prepare_new_user, user_write_failed};

use super::AuthService;

/// 自助注册，固定为 student 角色
pub async fn handle_register(
    service: &AuthService,
    mut create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    create_request.role_ids = None;
    if let Err(response) = prepare_new_user(&storage, &mut create_request, request).await {
        return Ok(response);
    }

    match storage.create_user(create_request).await {
        Ok(user) => {
            tracing::info!("User {} registered", user.username);
            if let Some(mailer) = mailer_from(request) {
                mailer.send_in_background(welcome_email(&user));
            }
            Ok(HttpResponse::Created().json(
                ApiResponse::success(UserResponse { user }, "Registration successful").at(request),
            ))
        }
        Err(e) => Ok(user_write_failed(
            request,
            e,
            ErrorCode::RegisterFailed,
            "Registration failed",
        )),
    }
}
