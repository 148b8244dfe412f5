/// 支持上传的图片格式：(扩展名, MIME)
pub const IMAGE_TYPES: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".webp", "image/webp"),
];

/// 根据文件头识别图片 MIME 类型
pub fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// 扩展名对应的 MIME 类型（扩展名包含点号）
pub fn image_mime_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（包含点号，如 ".png"）
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    match (detect_image_mime(data), image_mime_for_extension(extension)) {
        (Some(detected), Some(expected)) => detected == expected,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_png_magic() {
        assert!(validate_magic_bytes(&PNG_HEADER, ".png"));
        assert!(validate_magic_bytes(&PNG_HEADER, ".PNG"));
        assert!(!validate_magic_bytes(&PNG_HEADER, ".jpg"));
    }

    #[test]
    fn test_jpeg_magic() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0];
        assert!(validate_magic_bytes(&jpeg_header, ".jpg"));
        assert!(validate_magic_bytes(&jpeg_header, ".jpeg"));
        assert_eq!(detect_image_mime(&jpeg_header), Some("image/jpeg"));
    }

    #[test]
    fn test_webp_magic() {
        let webp = b"RIFF\x00\x00\x00\x00WEBPVP8 ";
        assert!(validate_magic_bytes(webp, ".webp"));
    }

    #[test]
    fn test_non_images_rejected() {
        assert!(!validate_magic_bytes(b"%PDF-1.4", ".pdf"));
        assert!(!validate_magic_bytes(b"Hello, World!", ".txt"));
        assert!(!validate_magic_bytes(&[], ".png"));
    }
}
