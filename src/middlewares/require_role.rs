/*!
 * 基于角色的访问控制中间件
 *
 * 必须放在 RequireJWT 之后，按角色名称判断当前用户能否访问。
 *
 * ```rust,ignore
 * web::scope("/roles")
 *     .wrap(RequireJWT)
 *     .service(
 *         web::scope("")
 *             .wrap(RequireRole::new_any(ADMIN_ROLES))
 *             .route("", web::get().to(list_roles)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    roles::entities::PERMISSION_DENIED_MESSAGE,
    users::entities::User,
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<String>,
    require_all: bool, // true 表示需要所有角色，false 表示任一角色即可
}

impl RequireRole {
    /// 需要特定角色
    pub fn new(role: &str) -> Self {
        Self {
            required_roles: vec![role.to_string()],
            require_all: true,
        }
    }

    /// 需要任一角色
    pub fn new_any(roles: &[&str]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| r.to_string()).collect(),
            require_all: false,
        }
    }

    fn is_satisfied_by(required_roles: &[String], require_all: bool, user: &User) -> bool {
        if require_all {
            required_roles.iter().all(|role| user.has_role(role))
        } else {
            required_roles.iter().any(|role| user.has_role(role))
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: Rc::new(self.required_roles.clone()),
            require_all: self.require_all,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Rc<Vec<String>>,
    require_all: bool,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_roles = self.required_roles.clone();
        let require_all = self.require_all;

        Box::pin(async move {
            let user = req.extensions().get::<User>().cloned();
            let path = req.path().to_string();

            match user {
                Some(user) => {
                    if RequireRole::is_satisfied_by(&required_roles, require_all, &user) {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        info!(
                            "Access denied for user {} (roles: {:?}). Required roles: {:?}",
                            user.id, user.roles, required_roles
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::FORBIDDEN,
                                ErrorCode::Forbidden,
                                PERMISSION_DENIED_MESSAGE,
                                &path,
                            )
                            .map_into_right_body(),
                        ))
                    }
                }
                None => {
                    info!(
                        "Role check failed: No user found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                            &path,
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roles::entities::ADMIN_ROLES;
    use crate::models::users::entities::fixtures::user_with_roles;
    use actix_web::dev::Service as _;
    use actix_web::{App, HttpResponse, test, web};

    /// 在请求扩展中放入测试用户
    fn with_user(
        roles: &'static [&'static str],
    ) -> impl Fn(ServiceRequest) -> ServiceRequest + Clone {
        move |req| {
            req.extensions_mut().insert(user_with_roles(1, roles));
            req
        }
    }

    #[actix_web::test]
    async fn test_non_admin_gets_fixed_forbidden_message() {
        let inject = with_user(&["tutor"]);
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new_any(ADMIN_ROLES))
                    .wrap_fn(move |req, srv| srv.call(inject(req)))
                    .route("", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], PERMISSION_DENIED_MESSAGE);
        assert_eq!(body["code"], ErrorCode::Forbidden as i32);
    }

    #[actix_web::test]
    async fn test_admin_passes() {
        let inject = with_user(&["student", "admin"]);
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new_any(ADMIN_ROLES))
                    .wrap_fn(move |req, srv| srv.call(inject(req)))
                    .route("", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new("admin"))
                    .route("", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
