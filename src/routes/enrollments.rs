use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::enrollments::requests::{
    CreateEnrollmentRequest, EnrollmentListParams, UpdateEnrollmentRequest,
};
use crate::services::EnrollmentService;
use crate::utils::SafeIDI64;

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn list_enrollments(
    req: HttpRequest,
    query: web::Query<EnrollmentListParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_enrollments(query.into_inner(), &req)
        .await
}

pub async fn create_enrollment(
    req: HttpRequest,
    body: web::Json<CreateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .create_enrollment(body.into_inner(), &req)
        .await
}

pub async fn get_enrollment(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.get_enrollment(enrollment_id.0, &req).await
}

pub async fn update_enrollment(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
    body: web::Json<UpdateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .update_enrollment(enrollment_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_enrollment(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .delete_enrollment(enrollment_id.0, &req)
        .await
}

// 配置路由（权限按角色和归属在服务层判断）
pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_enrollments))
            .route("", web::post().to(create_enrollment))
            .route("/{id}", web::get().to(get_enrollment))
            .route("/{id}", web::patch().to(update_enrollment))
            .route("/{id}", web::delete().to(delete_enrollment)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::models::courses::entities::{Course, CourseStatus};
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::enrollments::entities::EnrollmentStatus;
    use crate::test_support::{TestContext, bearer, test_app};

    async fn course(ctx: &TestContext, tutor_id: i64, status: CourseStatus) -> Course {
        ctx.storage
            .create_course(CreateCourseRequest {
                title: "Biology".into(),
                description: None,
                category_id: None,
                tutor_id: Some(tutor_id),
                status: Some(status),
            })
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_self_enrollment_and_duplicate() {
        let ctx = TestContext::new().await;
        let (tutor, _) = ctx.user("tutor1", &["tutor"]).await;
        let (student, token) = ctx.user("stud1", &["student"]).await;
        let course = course(&ctx, tutor.id, CourseStatus::Published).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/enrollments")
            .insert_header(bearer(&token))
            .set_json(json!({ "course_id": course.id }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["student_id"], student.id);
        assert_eq!(body["data"]["status"], "active");

        let req = TestRequest::post()
            .uri("/api/v1/enrollments")
            .insert_header(bearer(&token))
            .set_json(json!({ "course_id": course.id }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_student_cannot_enroll_in_draft_course() {
        let ctx = TestContext::new().await;
        let (tutor, _) = ctx.user("tutor1", &["tutor"]).await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let course = course(&ctx, tutor.id, CourseStatus::Draft).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/enrollments")
            .insert_header(bearer(&token))
            .set_json(json!({ "course_id": course.id }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_student_cannot_enroll_someone_else() {
        let ctx = TestContext::new().await;
        let (tutor, _) = ctx.user("tutor1", &["tutor"]).await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let (other, _) = ctx.user("stud2", &["student"]).await;
        let course = course(&ctx, tutor.id, CourseStatus::Published).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/enrollments")
            .insert_header(bearer(&token))
            .set_json(json!({ "course_id": course.id, "student_id": other.id }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_only_course_tutor_updates_progress() {
        let ctx = TestContext::new().await;
        let (tutor, tutor_token) = ctx.user("tutor1", &["tutor"]).await;
        let (student, student_token) = ctx.user("stud1", &["student"]).await;
        let course = course(&ctx, tutor.id, CourseStatus::Published).await;
        let enrollment = ctx
            .storage
            .create_enrollment(student.id, course.id, EnrollmentStatus::Active)
            .await
            .unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::patch()
            .uri(&format!("/api/v1/enrollments/{}", enrollment.id))
            .insert_header(bearer(&student_token))
            .set_json(json!({ "progress": 100 }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::patch()
            .uri(&format!("/api/v1/enrollments/{}", enrollment.id))
            .insert_header(bearer(&tutor_token))
            .set_json(json!({ "progress": 150 }))
            .to_request();
        assert_eq!(
            call_service(&app, req).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let req = TestRequest::patch()
            .uri(&format!("/api/v1/enrollments/{}", enrollment.id))
            .insert_header(bearer(&tutor_token))
            .set_json(json!({ "progress": 40 }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["progress"], 40);
    }
}
