use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::files::requests::{FileListParams, RegisterFileRequest};
use crate::services::FileService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_upload(&request, payload).await
}

pub async fn register_file(
    request: HttpRequest,
    body: web::Json<RegisterFileRequest>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.register_file(body.into_inner(), &request).await
}

pub async fn list_files(
    request: HttpRequest,
    query: web::Query<FileListParams>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.list_files(query.into_inner(), &request).await
}

pub async fn get_file(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.get_file(file_id.0, &request).await
}

pub async fn handle_download(
    request: HttpRequest,
    file_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_download(file_id.0, &request).await
}

pub async fn delete_file(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.delete_file(file_id.0, &request).await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/files")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/upload")
                    .wrap(RateLimit::file_upload())
                    .route(web::post().to(handle_upload)),
            )
            .route("", web::get().to(list_files))
            .route("", web::post().to(register_file))
            .route("/{id}", web::get().to(get_file))
            .route("/{id}", web::delete().to(delete_file))
            .route("/{id}/download", web::get().to(handle_download)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use crate::test_support::{TestContext, bearer, test_app};

    fn avatar(user_id: i64, url: &str) -> Value {
        json!({
            "kind": "user_avatar",
            "target_id": user_id,
            "file_path": url,
            "original_name": "me.png",
            "content_type": "image/png",
        })
    }

    #[actix_web::test]
    async fn test_register_requires_url() {
        let ctx = TestContext::new().await;
        let (user, token) = ctx.user("stud1", &["student"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/files")
            .insert_header(bearer(&token))
            .set_json(avatar(user.id, "not a url"))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "File path must be a valid URL");
    }

    #[actix_web::test]
    async fn test_new_avatar_replaces_old_one() {
        let ctx = TestContext::new().await;
        let (user, token) = ctx.user("stud1", &["student"]).await;
        let app = test_app!(ctx);

        for url in ["https://cdn.example.com/a.png", "https://cdn.example.com/b.png"] {
            let req = TestRequest::post()
                .uri("/api/v1/files")
                .insert_header(bearer(&token))
                .set_json(avatar(user.id, url))
                .to_request();
            assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let avatars = ctx.storage.list_user_avatars(user.id).await.unwrap();
        assert_eq!(avatars.len(), 1);
        assert_eq!(avatars[0].file_path, "https://cdn.example.com/b.png");
    }

    #[actix_web::test]
    async fn test_cannot_set_someone_elses_avatar() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("stud1", &["student"]).await;
        let (other, _) = ctx.user("stud2", &["student"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/files")
            .insert_header(bearer(&token))
            .set_json(avatar(other.id, "https://cdn.example.com/x.png"))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_target_is_not_found() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("admin1", &["admin"]).await;
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/v1/files")
            .insert_header(bearer(&token))
            .set_json(json!({
                "kind": "course_image",
                "target_id": 999,
                "file_path": "https://cdn.example.com/c.png",
                "original_name": "c.png",
                "content_type": "image/png",
            }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
