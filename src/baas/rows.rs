//! 存储行与应用实体之间的字段映射
//!
//! 一对一改名，缺失字段填默认值，不做其他转换。

use serde::{Deserialize, Serialize};

use crate::models::{
    chat::{ChatMessage, NewMessage},
    common::deserialize_id,
    events::{CalendarEvent, EventCategory, NewEvent},
    materials::{Material, MaterialKind, NewMaterial},
    users::entities::UserRole,
};

// 旧记录没有上传者时显示的名称
pub const DEFAULT_UPLOADER: &str = "Teacher";

pub const MATERIALS_TABLE: &str = "materials";
pub const EVENTS_TABLE: &str = "events";
pub const MESSAGES_TABLE: &str = "messages";
pub const STUDENTS_TABLE: &str = "students";

/// `materials` 表
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<MaterialKind>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            subject: row.subject.unwrap_or_default(),
            kind: row.kind.unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            uploaded_by: row
                .uploaded_by
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_UPLOADER.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMaterialRow {
    pub title: String,
    pub description: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: MaterialKind,
    pub url: String,
    pub uploaded_by: String,
}

impl From<NewMaterial> for NewMaterialRow {
    fn from(m: NewMaterial) -> Self {
        NewMaterialRow {
            title: m.title,
            description: m.description,
            subject: m.subject,
            kind: m.kind,
            url: m.url,
            uploaded_by: m.uploaded_by,
        }
    }
}

/// `events` 表
#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(rename = "type", default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl From<EventRow> for CalendarEvent {
    fn from(row: EventRow) -> Self {
        let end = row.end_time.unwrap_or_else(|| row.start_time.clone());
        CalendarEvent {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            start: row.start_time,
            end,
            category: row.category.unwrap_or(EventCategory::Other),
            subject: row.subject,
            created_by: row.created_by.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEventRow {
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub category: EventCategory,
    pub subject: Option<String>,
    pub created_by: String,
}

impl From<NewEvent> for NewEventRow {
    fn from(e: NewEvent) -> Self {
        NewEventRow {
            title: e.title,
            description: e.description,
            start_time: e.start,
            end_time: e.end,
            category: e.category,
            subject: e.subject,
            created_by: e.created_by,
        }
    }
}

/// `messages` 表
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_role: Option<UserRole>,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name.unwrap_or_default(),
            user_role: row.user_role.unwrap_or(UserRole::Student),
            text: row.text,
            timestamp: row.created_at.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessageRow {
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub text: String,
    pub created_at: String,
}

impl From<NewMessage> for NewMessageRow {
    fn from(m: NewMessage) -> Self {
        NewMessageRow {
            user_id: m.user_id,
            user_name: m.user_name,
            user_role: m.user_role,
            text: m.text,
            created_at: m.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_row_defaults_uploader() {
        let row: MaterialRow = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Algebra notes",
            "description": null,
            "subject": "Mathematics",
            "type": "PDF",
            "url": "https://cdn.example/a.pdf",
            "created_at": "2024-06-01T10:00:00+00:00",
            "uploaded_by": null
        }))
        .unwrap();
        let material = Material::from(row);
        assert_eq!(material.id, "7");
        assert_eq!(material.kind, MaterialKind::Pdf);
        assert_eq!(material.uploaded_by, DEFAULT_UPLOADER);
        assert_eq!(material.description, "");
    }

    #[test]
    fn test_event_row_maps_storage_names() {
        let row: EventRow = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Physics exam",
            "start_time": "2024-06-03T08:00:00+00:00",
            "end_time": null,
            "type": "EXAM",
            "created_by": "u-teacher-1"
        }))
        .unwrap();
        let event = CalendarEvent::from(row);
        assert_eq!(event.start, "2024-06-03T08:00:00+00:00");
        assert_eq!(event.end, event.start);
        assert_eq!(event.created_by, "u-teacher-1");

        let app_json = serde_json::to_value(&event).unwrap();
        assert!(app_json.get("createdBy").is_some());
        assert!(app_json.get("start_time").is_none());
    }

    #[test]
    fn test_new_event_row_uses_storage_names() {
        let row = NewEventRow::from(NewEvent {
            title: "Review".into(),
            description: String::new(),
            start: "2024-06-01T09:00".into(),
            end: "2024-06-01T10:00".into(),
            category: EventCategory::Review,
            subject: Some("History".into()),
            created_by: "u1".into(),
        });
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["start_time"], "2024-06-01T09:00");
        assert_eq!(json["end_time"], "2024-06-01T10:00");
        assert_eq!(json["type"], "REVIEW");
        assert_eq!(json["created_by"], "u1");
    }

    #[test]
    fn test_message_row_maps_created_at_to_timestamp() {
        let row: MessageRow = serde_json::from_value(serde_json::json!({
            "id": 99,
            "user_id": "u1",
            "user_name": "Harry P.",
            "user_role": "STUDENT",
            "text": "hello",
            "created_at": "2024-06-01T12:00:00+00:00"
        }))
        .unwrap();
        let message = ChatMessage::from(row);
        assert_eq!(message.timestamp, "2024-06-01T12:00:00+00:00");
        assert_eq!(message.user_role, UserRole::Student);
    }
}
