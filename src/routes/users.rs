use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::roles::entities::ADMIN_ROLES;
use crate::models::users::requests::{
    AssignRoleRequest, CreateUserRequest, UpdateUserRequest, UserListParams,
};
use crate::services::UserService;
use crate::utils::{SafeIDI64, SafeRoleIdI64};

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

// HTTP处理程序
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn update_user(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn list_user_roles(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_user_roles(user_id.0, &req).await
}

pub async fn assign_role(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<AssignRoleRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .assign_role(user_id.0, body.into_inner(), &req)
        .await
}

pub async fn revoke_role(
    req: HttpRequest,
    user_id: SafeIDI64,
    role_id: SafeRoleIdI64,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.revoke_role(user_id.0, role_id.0, &req).await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES))
                    .route("", web::get().to(list_users))
                    .route("", web::post().to(create_user))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::patch().to(update_user))
                    .route("/{id}", web::delete().to(delete_user))
                    .route("/{id}/roles", web::get().to(list_user_roles))
                    .route("/{id}/roles", web::post().to(assign_role))
                    .route("/{id}/roles/{role_id}", web::delete().to(revoke_role)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::models::roles::entities::PERMISSION_DENIED_MESSAGE;
    use crate::test_support::{TestContext, bearer, test_app};

    #[actix_web::test]
    async fn test_duplicate_email_is_rejected_without_insert() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);
        let before = ctx.storage.count_users().await.unwrap();

        let req = TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "username": "someone",
                "email": "ADMIN1@Example.com",
                "password": "Secret123",
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email already exists");
        assert_eq!(body["path"], "/api/v1/users");

        assert_eq!(ctx.storage.count_users().await.unwrap(), before);
    }

    #[actix_web::test]
    async fn test_invalid_payload_is_unprocessable() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "Secret123",
                "phone": "12",
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "Phone number must be 7-15 digits, optionally starting with '+'"
        );
    }

    #[actix_web::test]
    async fn test_admin_cannot_delete_self() {
        let ctx = TestContext::new().await;
        let (admin, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", admin.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(ctx.storage.get_user_by_id(admin.id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_student_is_forbidden() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], PERMISSION_DENIED_MESSAGE);
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);

        let req = TestRequest::get().uri("/api/v1/users").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
