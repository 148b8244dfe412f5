use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use super::{FileService, authorize_target, local_path, public_url, save_file_record};
use crate::config::AppConfig;
use crate::errors::TutorHubError;
use crate::middlewares::RequireJWT;
use crate::models::files::entities::{FileKind, FileTarget, NewFileUpload};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, unauthorized, validation_failed};
use crate::utils::file_magic::image_mime_for_extension;
use crate::utils::validate_magic_bytes;

/// 文本字段的最大长度
const MAX_TEXT_FIELD: usize = 64;

/// 已写入磁盘的上传文件
struct StoredFile {
    stored_name: String,
    original_name: String,
    content_type: String,
    size: i64,
}

/// 上传失败时的结果：直接返回给客户端的响应
type UploadOutcome<T> = Result<T, HttpResponse>;

pub async fn handle_upload(
    service: &FileService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };

    let upload_dir = &AppConfig::get().upload.dir;
    if !Path::new(upload_dir).exists()
        && let Err(e) = fs::create_dir_all(upload_dir)
    {
        tracing::error!("{}", TutorHubError::file_operation(format!("{e}")));
        return Ok(internal_error(
            request,
            ErrorCode::FileUploadFailed,
            "Failed to create upload directory",
        ));
    }

    let mut kind: Option<String> = None;
    let mut target_id: Option<String> = None;
    let mut stored: Option<StoredFile> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        let outcome = match name.as_str() {
            "kind" => read_text_field(&mut field, request).await.map(|v| kind = Some(v)),
            "target_id" => read_text_field(&mut field, request)
                .await
                .map(|v| target_id = Some(v)),
            "file" if stored.is_some() => Err(bad_request(
                request,
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            )),
            "file" => store_file(&mut field, request).await.map(|f| stored = Some(f)),
            // 未知字段直接丢弃
            _ => drain_field(&mut field).await,
        };

        if let Err(response) = outcome {
            discard(stored.as_ref());
            return Ok(response);
        }
    }

    let Some(file) = stored else {
        return Ok(validation_failed(request, "file is required"));
    };

    let target = match parse_target(kind.as_deref(), target_id.as_deref()) {
        Ok(target) => target,
        Err(msg) => {
            discard(Some(&file));
            return Ok(validation_failed(request, msg));
        }
    };

    let storage = service.get_storage(request)?;
    if let Err(response) = authorize_target(&storage, target, &user, request).await {
        discard(Some(&file));
        return Ok(response);
    }

    let record = NewFileUpload {
        target,
        file_path: public_url(&file.stored_name),
        stored_name: Some(file.stored_name.clone()),
        original_name: file.original_name.clone(),
        content_type: file.content_type.clone(),
        file_size: file.size,
        uploaded_by: Some(user.id),
    };

    match save_file_record(&storage, record).await {
        Ok(saved) => {
            tracing::info!(
                "User {} uploaded {} for {} {}",
                user.id,
                saved.original_name,
                saved.kind,
                saved.target_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(saved, "File uploaded successfully").at(request)))
        }
        Err(e) => {
            discard(Some(&file));
            Ok(internal_error(
                request,
                ErrorCode::FileUploadFailed,
                format!("Failed to upload file: {e}"),
            ))
        }
    }
}

/// 解析 `kind` 和 `target_id` 字段
fn parse_target(kind: Option<&str>, target_id: Option<&str>) -> Result<FileTarget, String> {
    let kind: FileKind = kind.ok_or("kind is required")?.trim().parse()?;
    let target_id = target_id
        .ok_or("target_id is required")?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or("target_id must be a positive integer")?;
    Ok(FileTarget::new(kind, target_id))
}

async fn read_text_field(field: &mut Field, request: &HttpRequest) -> UploadOutcome<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| bad_request(request, ErrorCode::BadRequest, e.to_string()))?;
        buf.extend_from_slice(&data);
        if buf.len() > MAX_TEXT_FIELD {
            return Err(validation_failed(request, "Form field is too long"));
        }
    }
    String::from_utf8(buf).map_err(|_| validation_failed(request, "Form field must be UTF-8"))
}

async fn drain_field(field: &mut Field) -> UploadOutcome<()> {
    while let Some(chunk) = field.next().await {
        if chunk.is_err() {
            break;
        }
    }
    Ok(())
}

/// 校验扩展名、魔术字节与大小，并写入上传目录
async fn store_file(field: &mut Field, request: &HttpRequest) -> UploadOutcome<StoredFile> {
    let config = AppConfig::get();

    let original_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(|s| s.to_string())
        .unwrap_or_default();

    let extension = Path::new(&original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    let allowed = config
        .upload
        .allowed_types
        .iter()
        .any(|t| t.to_lowercase() == extension);
    let Some(content_type) = image_mime_for_extension(&extension).filter(|_| allowed) else {
        return Err(bad_request(
            request,
            ErrorCode::FileTypeNotAllowed,
            "File type not allowed",
        ));
    };

    let stored_name = format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp(),
        Uuid::new_v4(),
        extension
    );
    let path = local_path(&stored_name);
    let mut f = File::create(&path).map_err(|e| {
        tracing::error!("{}", TutorHubError::file_operation(format!("{e}")));
        internal_error(request, ErrorCode::FileUploadFailed, "Failed to create file")
    })?;

    let fail = |response: HttpResponse| {
        let _ = fs::remove_file(&path);
        response
    };

    let mut total_size: usize = 0;
    let mut header = Vec::with_capacity(16);
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| {
            fail(bad_request(request, ErrorCode::FileUploadFailed, e.to_string()))
        })?;

        // 魔术字节需要至少 12 字节的文件头
        if header.len() < 12 {
            let take = (12 - header.len()).min(data.len());
            header.extend_from_slice(&data[..take]);
        }

        total_size += data.len();
        if total_size > config.upload.max_size {
            return Err(fail(bad_request(
                request,
                ErrorCode::FileSizeExceeded,
                "File size exceeds the limit",
            )));
        }
        f.write_all(&data).map_err(|e| {
            tracing::error!("{}", TutorHubError::file_operation(format!("{e}")));
            fail(internal_error(
                request,
                ErrorCode::FileUploadFailed,
                "Failed to write file",
            ))
        })?;
    }

    if !validate_magic_bytes(&header, &extension) {
        return Err(fail(bad_request(
            request,
            ErrorCode::FileTypeNotAllowed,
            "File content does not match its extension",
        )));
    }

    Ok(StoredFile {
        stored_name,
        original_name,
        content_type: content_type.to_string(),
        size: total_size as i64,
    })
}

fn discard(file: Option<&StoredFile>) {
    if let Some(file) = file {
        super::remove_local_file(&file.stored_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target(Some("user_avatar"), Some(" 7 ")),
            Ok(FileTarget::UserAvatar { user_id: 7 })
        );
        assert_eq!(
            parse_target(None, Some("7")).unwrap_err(),
            "kind is required"
        );
        assert_eq!(
            parse_target(Some("course_image"), Some("-1")).unwrap_err(),
            "target_id must be a positive integer"
        );
        assert!(parse_target(Some("poster"), Some("1")).is_err());
    }
}
