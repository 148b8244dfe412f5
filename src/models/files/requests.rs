use serde::Deserialize;
use validator::Validate;

use super::entities::FileKind;
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_string_to_i64;
use crate::utils::validate::ValidateRequest;

// 文件列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct FileListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub kind: Option<FileKind>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub target_id: Option<i64>,
}

// 文件列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct FileListQuery {
    pub page: i64,
    pub page_size: i64,
    pub kind: Option<FileKind>,
    pub target_id: Option<i64>,
    /// 非管理员只能看到自己上传的文件
    pub uploaded_by: Option<i64>,
}

// 登记外部文件请求
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterFileRequest {
    pub kind: FileKind,
    pub target_id: i64,
    #[validate(url(message = "File path must be a valid URL"))]
    pub file_path: String,
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub original_name: String,
    #[validate(length(min = 1, max = 100, message = "Content type must be 1-100 characters"))]
    pub content_type: String,
    /// 字节数，未知时为 0
    #[serde(default)]
    pub file_size: u32,
}

impl ValidateRequest for RegisterFileRequest {
    const FIELD_ORDER: &'static [&'static str] =
        &["file_path", "original_name", "content_type"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_must_be_url() {
        let req = RegisterFileRequest {
            kind: FileKind::CourseImage,
            target_id: 1,
            file_path: "not a url".into(),
            original_name: "cover.png".into(),
            content_type: "image/png".into(),
            file_size: 10,
        };
        assert_eq!(
            req.validate_request().unwrap_err(),
            "File path must be a valid URL"
        );

        let req = RegisterFileRequest {
            file_path: "https://cdn.example.com/cover.png".into(),
            ..req
        };
        assert!(req.validate_request().is_ok());
    }
}
