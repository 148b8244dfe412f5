use serde::{Deserialize, Serialize};

use crate::string_enum;

string_enum! {
    // 文件类型
    pub enum FileKind("file kind") {
        CourseImage => "course_image",
        CategoryImage => "category_image",
        UserAvatar => "user_avatar",
    }
}

/// 文件的归属对象，每种文件类型对应一种目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTarget {
    CourseImage { course_id: i64 },
    CategoryImage { category_id: i64 },
    UserAvatar { user_id: i64 },
}

impl FileTarget {
    pub fn new(kind: FileKind, target_id: i64) -> Self {
        match kind {
            FileKind::CourseImage => FileTarget::CourseImage {
                course_id: target_id,
            },
            FileKind::CategoryImage => FileTarget::CategoryImage {
                category_id: target_id,
            },
            FileKind::UserAvatar => FileTarget::UserAvatar { user_id: target_id },
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            FileTarget::CourseImage { .. } => FileKind::CourseImage,
            FileTarget::CategoryImage { .. } => FileKind::CategoryImage,
            FileTarget::UserAvatar { .. } => FileKind::UserAvatar,
        }
    }

    pub fn target_id(&self) -> i64 {
        match *self {
            FileTarget::CourseImage { course_id } => course_id,
            FileTarget::CategoryImage { category_id } => category_id,
            FileTarget::UserAvatar { user_id } => user_id,
        }
    }
}

// 文件记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUpload {
    pub id: i64,
    pub kind: FileKind,
    pub target_id: i64,
    /// 文件的访问 URL
    pub file_path: String,
    /// 本地存储文件名，外部文件为空
    #[serde(skip)]
    pub stored_name: Option<String>,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FileUpload {
    pub fn target(&self) -> FileTarget {
        FileTarget::new(self.kind, self.target_id)
    }

    pub fn is_local(&self) -> bool {
        self.stored_name.is_some()
    }
}

// 新文件记录（用于存储层）
#[derive(Debug, Clone)]
pub struct NewFileUpload {
    pub target: FileTarget,
    pub file_path: String,
    pub stored_name: Option<String>,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip() {
        for kind in FileKind::ALL {
            let target = FileTarget::new(*kind, 42);
            assert_eq!(target.kind(), *kind);
            assert_eq!(target.target_id(), 42);
        }
    }
}
