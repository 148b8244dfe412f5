use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::roles::entities::ADMIN_ROLES;
use crate::models::roles::requests::{
    AssignPermissionsRequest, CreatePermissionRequest, CreateRoleRequest, PermissionListParams,
    RoleListParams, UpdateRoleRequest,
};
use crate::services::{PermissionService, RoleService};
use crate::utils::{SafeIDI64, SafePermissionIdI64};

static ROLE_SERVICE: Lazy<RoleService> = Lazy::new(RoleService::new_lazy);
static PERMISSION_SERVICE: Lazy<PermissionService> = Lazy::new(PermissionService::new_lazy);

pub async fn list_roles(
    req: HttpRequest,
    query: web::Query<RoleListParams>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.list_roles(query.into_inner(), &req).await
}

pub async fn create_role(
    req: HttpRequest,
    body: web::Json<CreateRoleRequest>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.create_role(body.into_inner(), &req).await
}

pub async fn get_role(req: HttpRequest, role_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.get_role(role_id.0, &req).await
}

pub async fn update_role(
    req: HttpRequest,
    role_id: SafeIDI64,
    body: web::Json<UpdateRoleRequest>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE
        .update_role(role_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_role(req: HttpRequest, role_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.delete_role(role_id.0, &req).await
}

pub async fn assign_permissions(
    req: HttpRequest,
    role_id: SafeIDI64,
    body: web::Json<AssignPermissionsRequest>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE
        .assign_permissions(role_id.0, body.into_inner(), &req)
        .await
}

pub async fn revoke_permission(
    req: HttpRequest,
    role_id: SafeIDI64,
    permission_id: SafePermissionIdI64,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE
        .revoke_permission(role_id.0, permission_id.0, &req)
        .await
}

pub async fn list_permissions(
    req: HttpRequest,
    query: web::Query<PermissionListParams>,
) -> ActixResult<HttpResponse> {
    PERMISSION_SERVICE
        .list_permissions(query.into_inner(), &req)
        .await
}

pub async fn create_permission(
    req: HttpRequest,
    body: web::Json<CreatePermissionRequest>,
) -> ActixResult<HttpResponse> {
    PERMISSION_SERVICE
        .create_permission(body.into_inner(), &req)
        .await
}

pub async fn delete_permission(
    req: HttpRequest,
    permission_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    PERMISSION_SERVICE
        .delete_permission(permission_id.0, &req)
        .await
}

// 配置路由
pub fn configure_role_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/roles")
            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/{id}", web::get().to(get_role))
            .route("/{id}", web::put().to(update_role))
            .route("/{id}", web::patch().to(update_role))
            .route("/{id}", web::delete().to(delete_role))
            .route("/{id}/permissions", web::post().to(assign_permissions))
            .route(
                "/{id}/permissions/{permission_id}",
                web::delete().to(revoke_permission),
            ),
    )
    .service(
        web::scope("/api/v1/permissions")
            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_permissions))
            .route("", web::post().to(create_permission))
            .route("/{id}", web::delete().to(delete_permission)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::models::roles::entities::{
        PERMISSION_DENIED_MESSAGE, ROLE_IN_USE_MESSAGE, SYSTEM_ROLE_PROTECTED_MESSAGE,
    };
    use crate::models::roles::requests::CreateRoleRequest;
    use crate::test_support::{TestContext, bearer, test_app};

    #[actix_web::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let (member, _) = ctx.user("member", &[]).await;
        let role = ctx
            .storage
            .create_role(CreateRoleRequest {
                name: "mentor".into(),
                description: None,
            })
            .await
            .unwrap();
        assert!(ctx.storage.assign_role_to_user(member.id, role.id).await.unwrap());
        let app = test_app!(ctx);

        let req = TestRequest::delete()
            .uri(&format!("/api/v1/roles/{}", role.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], ROLE_IN_USE_MESSAGE);
        assert!(ctx.storage.get_role_by_id(role.id).await.unwrap().is_some());

        assert!(ctx.storage.revoke_role_from_user(member.id, role.id).await.unwrap());
        let req = TestRequest::delete()
            .uri(&format!("/api/v1/roles/{}", role.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_system_role_is_protected() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let tutor = ctx.storage.get_role_by_name("tutor").await.unwrap().unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::delete()
            .uri(&format!("/api/v1/roles/{}", tutor.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], SYSTEM_ROLE_PROTECTED_MESSAGE);
    }

    #[actix_web::test]
    async fn test_system_role_cannot_be_renamed() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let tutor = ctx.storage.get_role_by_name("tutor").await.unwrap().unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::put()
            .uri(&format!("/api/v1/roles/{}", tutor.id))
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "coach" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], SYSTEM_ROLE_PROTECTED_MESSAGE);

        // 只改描述是允许的
        let req = TestRequest::patch()
            .uri(&format!("/api/v1/roles/{}", tutor.id))
            .insert_header(bearer(&token))
            .set_json(json!({ "description": "Course owners" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["name"], "tutor");
        assert_eq!(body["data"]["description"], "Course owners");
    }

    #[actix_web::test]
    async fn test_role_of_deleted_user_can_be_deleted() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let (member, _) = ctx.user("member", &[]).await;
        let role = ctx
            .storage
            .create_role(CreateRoleRequest {
                name: "mentor".into(),
                description: None,
            })
            .await
            .unwrap();
        assert!(ctx.storage.assign_role_to_user(member.id, role.id).await.unwrap());
        let app = test_app!(ctx);

        let req = TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", member.id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::delete()
            .uri(&format!("/api/v1/roles/{}", role.id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
        assert!(ctx.storage.get_role_by_id(role.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_duplicate_role_name() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/roles")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "student" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_student_cannot_manage_roles() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/roles")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "mentor" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], PERMISSION_DENIED_MESSAGE);
    }
}
