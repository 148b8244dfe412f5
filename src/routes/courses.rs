use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    CourseListParams, CreateCategoryRequest, CreateCourseRequest, CreateLessonRequest,
    CreateModuleRequest, UpdateCategoryRequest, UpdateCourseRequest, UpdateLessonRequest,
    UpdateModuleRequest,
};
use crate::models::roles::entities::{ADMIN_ROLES, STAFF_ROLES};
use crate::services::{CategoryService, CourseService};
use crate::utils::{SafeIDI64, SafeLessonIdI64, SafeModuleIdI64};

static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);
static CATEGORY_SERVICE: Lazy<CategoryService> = Lazy::new(CategoryService::new_lazy);

// 分类
pub async fn list_categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE.list_categories(&req).await
}

pub async fn create_category(
    req: HttpRequest,
    body: web::Json<CreateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE.create_category(body.into_inner(), &req).await
}

pub async fn update_category(
    req: HttpRequest,
    category_id: SafeIDI64,
    body: web::Json<UpdateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE
        .update_category(category_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_category(
    req: HttpRequest,
    category_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE.delete_category(category_id.0, &req).await
}

// 课程
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(course_id.0, &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(course_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(course_id.0, &req).await
}

// 章节
pub async fn list_modules(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_modules(course_id.0, &req).await
}

pub async fn create_module(
    req: HttpRequest,
    course_id: SafeIDI64,
    body: web::Json<CreateModuleRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_module(course_id.0, body.into_inner(), &req)
        .await
}

pub async fn update_module(
    req: HttpRequest,
    module_id: SafeModuleIdI64,
    body: web::Json<UpdateModuleRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_module(module_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_module(
    req: HttpRequest,
    module_id: SafeModuleIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_module(module_id.0, &req).await
}

// 课时
pub async fn list_lessons(
    req: HttpRequest,
    module_id: SafeModuleIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_lessons(module_id.0, &req).await
}

pub async fn create_lesson(
    req: HttpRequest,
    module_id: SafeModuleIdI64,
    body: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_lesson(module_id.0, body.into_inner(), &req)
        .await
}

pub async fn update_lesson(
    req: HttpRequest,
    lesson_id: SafeLessonIdI64,
    body: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_lesson(lesson_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_lesson(
    req: HttpRequest,
    lesson_id: SafeLessonIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_lesson(lesson_id.0, &req).await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/categories")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(web::get().to(list_categories)).route(
                    web::post()
                        .to(create_category)
                        .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::put()
                            .to(update_category)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    )
                    .route(
                        web::patch()
                            .to(update_category)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    )
                    .route(
                        web::delete()
                            .to(delete_category)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    ),
            ),
    )
    .service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                // 学生只能看到已发布的课程
                web::resource("").route(web::get().to(list_courses)).route(
                    web::post()
                        .to(create_course)
                        // 导师创建自己的课程，管理员可以指定导师
                        .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_course))
                    .route(
                        web::put()
                            .to(update_course)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    )
                    .route(
                        web::patch()
                            .to(update_course)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    )
                    .route(
                        web::delete()
                            .to(delete_course)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    ),
            )
            .service(
                web::resource("/{id}/modules")
                    .route(web::get().to(list_modules))
                    .route(
                        web::post()
                            .to(create_module)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    ),
            ),
    )
    .service(
        web::scope("/api/v1/modules")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{module_id}")
                    .route(
                        web::put()
                            .to(update_module)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    )
                    .route(
                        web::patch()
                            .to(update_module)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    )
                    .route(
                        web::delete()
                            .to(delete_module)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    ),
            )
            .service(
                web::resource("/{module_id}/lessons")
                    .route(web::get().to(list_lessons))
                    .route(
                        web::post()
                            .to(create_lesson)
                            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES)),
                    ),
            ),
    )
    .service(
        web::scope("/api/v1/lessons")
            .wrap(middlewares::RequireRole::new_any(STAFF_ROLES))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{lesson_id}")
                    .route(web::put().to(update_lesson))
                    .route(web::patch().to(update_lesson))
                    .route(web::delete().to(delete_lesson)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::models::courses::entities::CourseStatus;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::test_support::{TestContext, bearer, test_app};

    fn course_for(tutor_id: i64, title: &str, status: CourseStatus) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.into(),
            description: None,
            category_id: None,
            tutor_id: Some(tutor_id),
            status: Some(status),
        }
    }

    #[actix_web::test]
    async fn test_tutor_creates_course_for_self() {
        let ctx = TestContext::new().await;
        let (tutor, token) = ctx.user("tutor1", &["tutor"]).await;
        let (other, _) = ctx.user("tutor2", &["tutor"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "  Algebra  ", "tutor_id": other.id }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["title"], "Algebra");
        assert_eq!(body["data"]["tutor_id"], tutor.id);
    }

    #[actix_web::test]
    async fn test_other_tutor_cannot_update_course() {
        let ctx = TestContext::new().await;
        let (owner, _) = ctx.user("tutor1", &["tutor"]).await;
        let (_, intruder_token) = ctx.user("tutor2", &["tutor"]).await;
        let (_, admin_token) = ctx.user("admin1", &["admin"]).await;
        let course = ctx
            .storage
            .create_course(course_for(owner.id, "Physics", CourseStatus::Draft))
            .await
            .unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::patch()
            .uri(&format!("/api/v1/courses/{}", course.id))
            .insert_header(bearer(&intruder_token))
            .set_json(json!({ "title": "Hijacked" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::patch()
            .uri(&format!("/api/v1/courses/{}", course.id))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "title": "Physics II" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["title"], "Physics II");
    }

    #[actix_web::test]
    async fn test_student_cannot_create_course() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Chemistry" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_student_sees_only_published_courses() {
        let ctx = TestContext::new().await;
        let (tutor, _) = ctx.user("tutor1", &["tutor"]).await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        for (title, status) in [
            ("Published A", CourseStatus::Published),
            ("Draft", CourseStatus::Draft),
            ("Published B", CourseStatus::Published),
            ("Published C", CourseStatus::Published),
        ] {
            ctx.storage
                .create_course(course_for(tutor.id, title, status))
                .await
                .unwrap();
        }
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/v1/courses?page=2&page_size=2")
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        let pagination = &body["data"]["pagination"];
        assert_eq!(pagination["total"], 3);
        assert_eq!(pagination["total_pages"], 2);
        assert_eq!(pagination["has_next"], false);
        assert_eq!(pagination["has_prev"], true);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_draft_course_is_hidden_from_students() {
        let ctx = TestContext::new().await;
        let (tutor, _) = ctx.user("tutor1", &["tutor"]).await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let course = ctx
            .storage
            .create_course(course_for(tutor.id, "Draft", CourseStatus::Draft))
            .await
            .unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri(&format!("/api/v1/courses/{}", course.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_categories_are_admin_managed() {
        let ctx = TestContext::new().await;
        let (_, tutor_token) = ctx.user("tutor1", &["tutor"]).await;
        let (_, admin_token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&tutor_token))
            .set_json(json!({ "name": "Maths" }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
            let req = TestRequest::post()
                .uri("/api/v1/categories")
                .insert_header(bearer(&admin_token))
                .set_json(json!({ "name": "Maths" }))
                .to_request();
            assert_eq!(call_service(&app, req).await.status(), expected);
        }

        let req = TestRequest::get()
            .uri("/api/v1/categories")
            .insert_header(bearer(&tutor_token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
}
