use serde::Serialize;

use super::entities::CalendarEvent;

// 月历中的一天
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: chrono::NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
    // 在这一天新建日程时的默认时段
    pub default_start: String,
    pub default_end: String,
}

// 月历响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonthResponse {
    pub year: i32,
    pub month: u32,
    pub today: chrono::NaiveDate,
    pub days: Vec<CalendarDay>,
}

// 学科与日程类别选项
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub value: super::entities::EventCategory,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectsResponse {
    pub subjects: Vec<String>,
    pub categories: Vec<CategoryOption>,
}
