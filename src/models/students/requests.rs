use serde::Deserialize;

// 保存学生（有已签发的 id 则更新，否则新建）
#[derive(Debug, Clone, Deserialize)]
pub struct SaveStudentRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentListQuery {
    pub search: Option<String>,
}
