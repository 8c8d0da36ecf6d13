use serde::{Deserialize, Serialize};

use crate::models::users::entities::UserRole;

// 聊天消息（只追加，不可编辑或删除）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub text: String,
    pub timestamp: String,
}
