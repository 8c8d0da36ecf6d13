use serde::{Deserialize, Serialize};

// 资料文件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MaterialKind {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "DOCX")]
    Docx,
    #[serde(rename = "OTHER")]
    #[default]
    Other,
}

impl MaterialKind {
    /// 根据文件名推断类型
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            MaterialKind::Pdf
        } else if lower.ends_with(".docx") {
            MaterialKind::Docx
        } else {
            MaterialKind::Other
        }
    }
}

// 资料（应用侧字段名）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: MaterialKind,
    pub url: String,
    pub created_at: String,
    pub uploaded_by: String,
}

// 新建资料（文件已上传，url 已解析）
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub kind: MaterialKind,
    pub url: String,
    pub uploaded_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(MaterialKind::from_file_name("notes.pdf"), MaterialKind::Pdf);
        assert_eq!(MaterialKind::from_file_name("Essay.DOCX"), MaterialKind::Docx);
        assert_eq!(MaterialKind::from_file_name("slides.pptx"), MaterialKind::Other);
        assert_eq!(MaterialKind::from_file_name("README"), MaterialKind::Other);
    }
}
