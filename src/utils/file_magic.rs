use crate::models::materials::MaterialKind;

/// 验证上传文件的开头字节是否与推断出的资料类型相符
///
/// PDF 必须以 `%PDF` 开头，DOCX 是 ZIP 容器（`PK\x03\x04`），
/// 其他类型只要求内容非空。
pub fn content_matches_kind(data: &[u8], kind: MaterialKind) -> bool {
    if data.is_empty() {
        return false;
    }

    match kind {
        MaterialKind::Pdf => data.starts_with(b"%PDF"),
        MaterialKind::Docx => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        MaterialKind::Other => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic() {
        assert!(content_matches_kind(b"%PDF-1.7\n", MaterialKind::Pdf));
        assert!(!content_matches_kind(b"PK\x03\x04", MaterialKind::Pdf));
    }

    #[test]
    fn test_docx_magic() {
        assert!(content_matches_kind(
            &[0x50, 0x4B, 0x03, 0x04, 0x14],
            MaterialKind::Docx
        ));
        assert!(!content_matches_kind(b"%PDF", MaterialKind::Docx));
    }

    #[test]
    fn test_other_accepts_any_non_empty() {
        assert!(content_matches_kind(b"hello", MaterialKind::Other));
        assert!(!content_matches_kind(&[], MaterialKind::Other));
    }
}
