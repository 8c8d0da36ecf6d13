use serde::Deserialize;

// 资料列表筛选
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialListQuery {
    // 按标题搜索（忽略大小写）
    pub search: Option<String>,
    // 按学科筛选，"all" 或空表示不筛选
    pub subject: Option<String>,
}
