use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::require_jwt::RequireJWT;
use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::users::entities::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized};
use crate::utils::jwt;

use super::AuthService;

fn session_expired(request: &HttpRequest) -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(jwt::JwtUtils::create_empty_refresh_token_cookie())
        .json(
            ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Login expired or invalid, please login again",
            )
            .at(request),
        )
}

/// 用 refresh cookie 换取新的 access token，角色以数据库当前状态为准
pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(unauthorized(request));
    };

    let user_id = match jwt::JwtUtils::verify_refresh_token(&refresh_token)
        .ok()
        .and_then(|claims| claims.sub.parse::<i64>().ok())
    {
        Some(id) => id,
        None => {
            tracing::info!("Refresh token rejected");
            return Ok(session_expired(request));
        }
    };

    let storage = service.get_storage(request)?;
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.status == UserStatus::Active => user,
        Ok(_) => return Ok(session_expired(request)),
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Token refresh failed: {e}"),
            ));
        }
    };

    match jwt::JwtUtils::generate_access_token(user.id, &user.roles) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(
                RefreshTokenResponse {
                    access_token,
                    expires_in: config.jwt.access_token_expiry * 60,
                },
                "Token refreshed successfully",
            )
            .at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Token refresh failed: {e}"),
        )),
    }
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match RequireJWT::extract_user_claims(request) {
        Some(user) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(UserInfoResponse { user }, "User information retrieved successfully")
                .at(request),
        )),
        None => Ok(unauthorized(request)),
    }
}
