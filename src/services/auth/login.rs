use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::users::entities::UserStatus;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::services::common::{internal_error, validation_failed};
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

fn login_failed(request: &HttpRequest) -> HttpResponse {
    HttpResponse::Unauthorized().json(
        ApiResponse::error_empty(ErrorCode::AuthFailed, "Username or password is incorrect")
            .at(request),
    )
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let identifier = login_request.username.trim();
    if identifier.is_empty() || login_request.password.is_empty() {
        return Ok(validation_failed(
            request,
            "Username and password are required",
        ));
    }
    // 邮箱统一以小写存储
    let identifier = if identifier.contains('@') {
        identifier.to_lowercase()
    } else {
        identifier.to_string()
    };

    let storage = service.get_storage(request)?;
    let config = service.get_config();

    // 软删除的用户查询不到
    let user = match storage.get_user_by_username_or_email(&identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(login_failed(request)),
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Login failed: {e}"),
            ));
        }
    };

    if !verify_password(&login_request.password, &user.password_hash) {
        return Ok(login_failed(request));
    }

    if user.status != UserStatus::Active {
        return Ok(HttpResponse::Forbidden().json(
            ApiResponse::error_empty(ErrorCode::UserInactive, "User account is not active")
                .at(request),
        ));
    }

    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    match user.generate_token_pair() {
        Ok(token_pair) => {
            tracing::info!("User {} logged in successfully", user.username);

            let response = LoginResponse {
                access_token: token_pair.access_token,
                expires_in: config.jwt.access_token_expiry * 60,
                user,
            };
            let refresh_cookie =
                jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token);

            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, "Login successful").at(request)))
        }
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Login failed, unable to generate token: {e}"),
        )),
    }
}
