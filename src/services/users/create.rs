use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::notifications::templates::account_created_email;
use crate::services::common::{
    bad_request, internal_error, mailer_from, not_found, validation_failed,
};
use crate::errors::TutorHubError;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::ValidateRequest;

/// 校验、规范化并查重，成功后 `password` 被替换为哈希值
///
/// 注册与管理员创建共用，失败时返回可直接输出的响应。
pub(crate) async fn prepare_new_user(
    storage: &Arc<dyn Storage>,
    user_data: &mut CreateUserRequest,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();

    user_data
        .validate_request()
        .map_err(|msg| validation_failed(request, msg))?;

    match storage.is_username_taken(&user_data.username, None).await {
        Ok(true) => {
            return Err(bad_request(
                request,
                ErrorCode::UserAlreadyExists,
                "Username already exists",
            ));
        }
        Ok(false) => {}
        Err(e) => {
            return Err(internal_error(
                request,
                ErrorCode::UserCreationFailed,
                format!("User creation failed: {e}"),
            ));
        }
    }

    match storage.is_email_taken(&user_data.email, None).await {
        Ok(true) => {
            return Err(bad_request(
                request,
                ErrorCode::UserAlreadyExists,
                "Email already exists",
            ));
        }
        Ok(false) => {}
        Err(e) => {
            return Err(internal_error(
                request,
                ErrorCode::UserCreationFailed,
                format!("User creation failed: {e}"),
            ));
        }
    }

    user_data.password = hash_password(&user_data.password).map_err(|e| {
        internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Password hashing failed: {e}"),
        )
    })?;

    Ok(())
}

/// 写入用户失败时的响应，并发插入触发的唯一约束冲突按重复处理
pub(crate) fn user_write_failed(
    request: &HttpRequest,
    error: TutorHubError,
    code: ErrorCode,
    context: &str,
) -> HttpResponse {
    match error {
        TutorHubError::Conflict(_) => bad_request(
            request,
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        ),
        e => internal_error(request, code, format!("{context}: {e}")),
    }
}

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = prepare_new_user(&storage, &mut user_data, request).await {
        return Ok(response);
    }

    // 指定的角色必须都存在
    if let Some(role_ids) = &user_data.role_ids {
        for role_id in role_ids {
            match storage.get_role_by_id(*role_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Ok(not_found(
                        request,
                        ErrorCode::RoleNotFound,
                        format!("Role {role_id} not found"),
                    ));
                }
                Err(e) => {
                    return Ok(internal_error(
                        request,
                        ErrorCode::UserCreationFailed,
                        format!("User creation failed: {e}"),
                    ));
                }
            }
        }
    }

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} created with roles {:?}", user.username, user.roles);
            if let Some(mailer) = mailer_from(request) {
                mailer.send_in_background(account_created_email(&user));
            }
            Ok(HttpResponse::Created().json(
                ApiResponse::success(UserResponse { user }, "User created successfully")
                    .at(request),
            ))
        }
        Err(e) => Ok(user_write_failed(
            request,
            e,
            ErrorCode::UserCreationFailed,
            "User creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_unique_conflict_maps_to_duplicate() {
        let request = TestRequest::post().uri("/api/v1/users").to_http_request();

        let response = user_write_failed(
            &request,
            TutorHubError::conflict("UNIQUE constraint failed: users.email"),
            ErrorCode::UserCreationFailed,
            "User creation failed",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], ErrorCode::UserAlreadyExists as i32);

        let response = user_write_failed(
            &request,
            TutorHubError::database_operation("disk full"),
            ErrorCode::UserCreationFailed,
            "User creation failed",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
