use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::fs::File;
use std::io::Read;

use super::get::load_file;
use super::{FileService, local_path};
use crate::errors::TutorHubError;
use crate::models::ErrorCode;
use crate::services::common::{bad_request, internal_error, not_found};

pub async fn handle_download(
    service: &FileService,
    file_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let db_file = match load_file(&storage, file_id, request).await {
        Ok(file) => file,
        Err(response) => return Ok(response),
    };

    // 外部文件直接通过 file_path 访问
    let Some(stored_name) = db_file.stored_name.as_deref() else {
        return Ok(bad_request(
            request,
            ErrorCode::BadRequest,
            "Only locally stored files can be downloaded",
        ));
    };

    let path = local_path(stored_name);
    if !path.exists() {
        return Ok(not_found(
            request,
            ErrorCode::FileNotFound,
            "File content is missing",
        ));
    }

    let mut buf = Vec::new();
    if let Err(e) = File::open(&path).and_then(|mut file| file.read_to_end(&mut buf)) {
        tracing::error!("{}", TutorHubError::file_operation(format!("{e}")));
        return Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            "File read failed",
        ));
    }

    // 使用数据库中的原始文件名
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, db_file.content_type.as_str()))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                db_file.original_name.replace('"', "")
            ),
        ))
        .body(buf))
}
