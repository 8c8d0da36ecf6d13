use serde::{Deserialize, Serialize};

// 日程类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    #[default]
    Exam,
    Review,
    Activity,
    Other,
}

impl EventCategory {
    pub fn all() -> &'static [EventCategory] {
        &[
            EventCategory::Exam,
            EventCategory::Review,
            EventCategory::Activity,
            EventCategory::Other,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Exam => "Exam",
            EventCategory::Review => "Review",
            EventCategory::Activity => "Activity",
            EventCategory::Other => "Other",
        }
    }
}

// 日程（应用侧字段名）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub category: EventCategory,
    pub subject: Option<String>,
    pub created_by: String,
}

// 新建日程
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub category: EventCategory,
    pub subject: Option<String>,
    pub created_by: String,
}
