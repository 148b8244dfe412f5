use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::admin::requests::TestEmailRequest;
use crate::models::roles::entities::ADMIN_ROLES;
use crate::services::AdminService;

static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

pub async fn get_dashboard(request: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_dashboard(&request).await
}

pub async fn send_test_email(
    request: HttpRequest,
    body: web::Json<TestEmailRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .send_test_email(body.into_inner(), &request)
        .await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES))
            .wrap(middlewares::RequireJWT)
            .route("/dashboard", web::get().to(get_dashboard))
            .service(
                web::resource("/emails/test")
                    .wrap(RateLimit::email())
                    .route(web::post().to(send_test_email)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::notifications::mailer::fakes::{Behavior, FakeTransport, mailer_with};
    use crate::test_support::{TestContext, bearer, test_app};

    #[actix_web::test]
    async fn test_send_test_email_reports_delivery() {
        let (transport, attempts) = FakeTransport::new("fake", Behavior::Succeed);
        let ctx = TestContext::with_mailer(mailer_with(vec![transport])).await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/admin/emails/test")
            .insert_header(bearer(&token))
            .set_json(json!({ "to": "Ops@Example.com" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["delivered"], true);
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_failed_delivery_is_reported_not_raised() {
        let (transport, _) = FakeTransport::new("broken", Behavior::Fail);
        let ctx = TestContext::with_mailer(mailer_with(vec![transport])).await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/admin/emails/test")
            .insert_header(bearer(&token))
            .set_json(json!({ "to": "ops@example.com" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["delivered"], false);
    }

    #[actix_web::test]
    async fn test_dashboard_counts_users() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        ctx.user("stud1", &["student"]).await;
        ctx.user("tutor1", &["tutor"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["total_users"], 3);
        assert_eq!(body["data"]["users_by_role"]["tutor"], 1);
    }

    #[actix_web::test]
    async fn test_tutor_cannot_open_dashboard() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("tutor1", &["tutor"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
