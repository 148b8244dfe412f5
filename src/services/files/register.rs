use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FileService, authorize_target, save_file_record};
use crate::middlewares::RequireJWT;
use crate::models::files::entities::{FileTarget, NewFileUpload};
use crate::models::files::requests::RegisterFileRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn register_file(
    service: &FileService,
    mut body: RegisterFileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };

    body.file_path = body.file_path.trim().to_string();
    if let Err(msg) = body.validate_request() {
        return Ok(validation_failed(request, msg));
    }
    if body.target_id <= 0 {
        return Ok(validation_failed(request, "target_id must be a positive integer"));
    }

    let target = FileTarget::new(body.kind, body.target_id);
    let storage = service.get_storage(request)?;
    if let Err(response) = authorize_target(&storage, target, &user, request).await {
        return Ok(response);
    }

    let record = NewFileUpload {
        target,
        file_path: body.file_path,
        stored_name: None,
        original_name: body.original_name,
        content_type: body.content_type,
        file_size: i64::from(body.file_size),
        uploaded_by: Some(user.id),
    };

    match save_file_record(&storage, record).await {
        Ok(saved) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(saved, "File registered successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::FileUploadFailed,
            format!("Failed to register file: {e}"),
        )),
    }
}
