use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, warn};

use super::notifications::{ChatNotification, NotificationBus};
use crate::baas::Backend;
use crate::config::AppConfig;
use crate::middlewares::RequireSession;
use crate::models::users::entities::PortalUser;
use crate::models::{
    ApiResponse, ErrorCode,
    chat::{NewMessage, SendMessageRequest},
};

pub struct ChatService {
    backend: Option<Backend>,
}

/// 由当前用户和输入构造新消息，空白消息返回 None
pub fn compose_message(user: &PortalUser, text: &str) -> Option<NewMessage> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(NewMessage {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_role: user.role,
        text: text.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

impl ChatService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    // 最近的聊天记录，按时间正序
    pub async fn history(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let limit = AppConfig::get().portal.chat_history_limit;
        let messages = self
            .get_backend(request)
            .storage
            .list_messages(limit)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to load chat history: {}", e);
                Vec::new()
            });
        Ok(HttpResponse::Ok().json(ApiResponse::success(messages, "Messages loaded")))
    }

    // 发送消息并通知已打开的外壳
    pub async fn send(
        &self,
        send_request: SendMessageRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let Some(user) = RequireSession::extract_user(request) else {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Authentication required",
            )));
        };
        let Some(message) = compose_message(&user, &send_request.text) else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ChatMessageEmpty,
                "Message cannot be empty",
            )));
        };

        match self.get_backend(request).storage.insert_message(message).await {
            Ok(created) => {
                let bus = super::shared::<NotificationBus>(request, "NotificationBus");
                bus.publish(ChatNotification::from(&created));
                Ok(HttpResponse::Created().json(ApiResponse::success(created, "Message sent")))
            }
            Err(e) => {
                error!("Failed to send chat message: {}", e);
                Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ChatSendFailed,
                    "Failed to send message",
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    #[test]
    fn test_compose_trims_and_rejects_blank() {
        let user = PortalUser {
            id: "u-1".to_string(),
            name: "Harry P.".to_string(),
            email: "aluno@example.com".to_string(),
            role: UserRole::Student,
            avatar: None,
        };
        assert!(compose_message(&user, "   ").is_none());

        let message = compose_message(&user, "  hello  ").unwrap();
        assert_eq!(message.text, "hello");
        assert_eq!(message.user_role, UserRole::Student);
        assert!(chrono::DateTime::parse_from_rfc3339(&message.timestamp).is_ok());
    }
}
