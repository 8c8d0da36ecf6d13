use serde::Serialize;

use crate::models::events::entities::CalendarEvent;

// 仪表盘统计
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub materials_count: usize,
    pub events_count: usize,
    pub upcoming_events: usize,
    // 仅教师可见
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub greeting: String,
    pub first_name: String,
    pub stats: DashboardStats,
    pub upcoming: Vec<CalendarEvent>,
}
