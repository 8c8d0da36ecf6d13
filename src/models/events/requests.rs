use serde::Deserialize;

use super::entities::EventCategory;

// 创建日程请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: String,
    // 为空时与开始时间相同
    #[serde(default)]
    pub end: Option<String>,
    #[serde(rename = "type", default)]
    pub category: EventCategory,
    #[serde(default)]
    pub subject: Option<String>,
}

// 月历查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    // YYYY-MM-DD，默认今天
    pub date: Option<String>,
}
