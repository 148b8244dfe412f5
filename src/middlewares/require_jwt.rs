/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>`，加载当前用户（含角色与权限代码）并放入请求扩展。
 * 用户信息以 `user:{token}` 为键缓存在对象缓存中，角色或权限变更时整体失效。
 *
 * ```rust,ignore
 * web::scope("/users")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_users))
 * ```
 *
 * 处理函数中：
 *
 * ```rust,ignore
 * let user = RequireJWT::extract_user_claims(&req);
 * let user_id = RequireJWT::extract_user_id(&req);
 * ```
 */

use crate::cache::{CacheResult, ObjectCache, traits::ObjectCacheExt};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

/// 当前用户的缓存键
pub fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 提取并验证 JWT access token，返回当前用户
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = bearer_token(req).ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let user_id = JwtUtils::user_id_from_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    if let Some(cache) = &cache
        && let CacheResult::Found(user) = cache.get_json::<User>(&user_cache_key(token)).await
        && user.id == user_id
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage is not registered in app data");
            "Authentication backend unavailable".to_string()
        })?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", user_id, e);
            "Failed to retrieve user from storage".to_string()
        })?
        .ok_or_else(|| "User not found".to_string())?;

    if user.status != UserStatus::Active {
        return Err("User is not active".to_string());
    }

    if let Some(cache) = &cache {
        cache
            .insert_json(
                user_cache_key(token),
                &user,
                AppConfig::get().cache.default_ttl,
            )
            .await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                let path = req.path().to_string();
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "", &path)
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    let path = req.path().to_string();
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                            &path,
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户（需在 RequireJWT 保护的路由中调用）
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 当前用户的角色名称
    pub fn extract_user_roles(req: &actix_web::HttpRequest) -> Vec<String> {
        req.extensions()
            .get::<User>()
            .map(|user| user.roles.clone())
            .unwrap_or_default()
    }

    pub fn has_any_role(req: &actix_web::HttpRequest, roles: &[&str]) -> bool {
        req.extensions()
            .get::<User>()
            .is_some_and(|user| user.has_any_role(roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::MokaCacheWrapper;
    use crate::models::users::entities::fixtures::user_with_roles;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::extract_user_claims(&req) {
            Some(user) => HttpResponse::Ok().body(user.username),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(10, 60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache))
                .service(web::scope("/me").wrap(RequireJWT).route("", web::get().to(whoami))),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["path"], "/me");
    }

    #[actix_web::test]
    async fn test_cached_user_is_used() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(10, 60));
        let user = user_with_roles(7, &["student"]);
        let token = JwtUtils::generate_access_token(user.id, &user.roles).unwrap();
        cache.insert_json(user_cache_key(&token), &user, 0).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache))
                .service(web::scope("/me").wrap(RequireJWT).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "user7");
    }

    #[actix_web::test]
    async fn test_user_loaded_from_storage() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let created = storage
            .create_user(crate::storage::sea_orm_storage::users::new_user_request("carol"))
            .await
            .unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(10, 60));
        let token = JwtUtils::generate_access_token(created.id, &created.roles).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache.clone()))
                .service(web::scope("/me").wrap(RequireJWT).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(matches!(
            cache.get_raw(&user_cache_key(&token)).await,
            CacheResult::Found(_)
        ));
    }
}
