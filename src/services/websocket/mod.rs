/*!
 * 聊天实时推送
 *
 * 每条 WebSocket 连接持有一个独立的聊天消息订阅，连接结束时释放。
 *
 * ## 使用方法
 *
 * 浏览器无法为 WebSocket 设置请求头，令牌放在查询参数中：
 * ```text
 * ws://host/api/v1/chat/ws?token=<access_token>
 * ```
 *
 * ## 消息格式
 *
 * ### 服务端推送
 * ```json
 * {
 *     "type": "message",
 *     "payload": {
 *         "id": "42",
 *         "userId": "u-student-1",
 *         "userName": "Harry P.",
 *         "userRole": "STUDENT",
 *         "text": "Hello",
 *         "timestamp": "2024-05-10T12:00:00+00:00"
 *     }
 * }
 * ```
 *
 * ### 心跳
 * ```json
 * {"type": "ping"}
 * {"type": "pong"}
 * ```
 */

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use actix_ws::Message;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::baas::{Backend, MessageSubscription};
use crate::models::chat::{ChatMessage, ChatStreamQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::SessionManager;

const HEARTBEAT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

/// WebSocket 消息类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// 新聊天消息
    Message { payload: ChatMessage },
    /// 心跳请求
    Ping,
    /// 心跳响应
    Pong,
    /// 连接成功
    Connected { user_id: String },
    /// 错误消息
    Error { message: String },
}

impl WsMessage {
    fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// 聊天推送服务
pub struct ChatStreamService;

impl ChatStreamService {
    /// 校验令牌、订阅实时消息并升级连接
    pub async fn connect(
        request: HttpRequest,
        body: web::Payload,
        query: ChatStreamQuery,
    ) -> ActixResult<HttpResponse> {
        let token = query.token.trim();
        let sessions = crate::services::shared::<SessionManager>(&request, "SessionManager");
        let user = match sessions.establish(token).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::SessionExpired,
                    "Session expired, please sign in again",
                )));
            }
            Err(e) => {
                error!("Session lookup failed for chat stream: {}", e);
                return Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Identity service unavailable",
                )));
            }
        };

        let backend = crate::services::shared::<Backend>(&request, "Backend").with_bearer(token);
        let subscription = match backend.realtime.subscribe_messages().await {
            Ok(subscription) => subscription,
            Err(e) => {
                error!("Realtime subscription failed: {}", e);
                return Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                    ErrorCode::RealtimeUnavailable,
                    "Realtime chat is unavailable",
                )));
            }
        };

        let (response, session, stream) = actix_ws::handle(&request, body)?;
        actix_web::rt::spawn(Self::handle_connection(user.id, session, stream, subscription));
        Ok(response)
    }

    /// 处理 WebSocket 连接，结束时释放订阅
    pub async fn handle_connection(
        user_id: String,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
        mut subscription: MessageSubscription,
    ) {
        info!("Chat stream connected for user: {}", user_id);

        if let Some(json) = (WsMessage::Connected {
            user_id: user_id.clone(),
        })
        .to_json()
        {
            let _ = session.text(json).await;
        }

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                // 来自客户端的消息
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<WsMessage>(&text) {
                                Ok(WsMessage::Ping) => {
                                    let pong = WsMessage::Pong
                                        .to_json()
                                        .unwrap_or_else(|| r#"{"type":"pong"}"#.to_string());
                                    if session.text(pong).await.is_err() {
                                        break;
                                    }
                                }
                                Ok(other) => {
                                    debug!("Ignoring client message from {}: {:?}", user_id, other);
                                }
                                Err(_) => {
                                    let error = WsMessage::Error {
                                        message: "Unrecognised message".to_string(),
                                    };
                                    if let Some(json) = error.to_json()
                                        && session.text(json).await.is_err()
                                    {
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Chat stream closed by user: {}", user_id);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("Chat stream error for user {}: {:?}", user_id, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // 实时订阅推送的新消息
                incoming = subscription.next() => {
                    match incoming {
                        Some(message) => {
                            let push = WsMessage::Message { payload: message };
                            if let Some(json) = push.to_json()
                                && session.text(json).await.is_err()
                            {
                                break;
                            }
                        }
                        None => {
                            warn!("Realtime subscription ended for user: {}", user_id);
                            break;
                        }
                    }
                }

                // 心跳
                _ = heartbeat.tick() => {
                    if session.ping(b"").await.is_err() {
                        break;
                    }
                }
            }
        }

        subscription.unsubscribe();
        let _ = session.close(None).await;
        info!("Chat stream disconnected for user: {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    #[test]
    fn test_message_frame_shape() {
        let frame = WsMessage::Message {
            payload: ChatMessage {
                id: "1".to_string(),
                user_id: "u-1".to_string(),
                user_name: "Harry P.".to_string(),
                user_role: UserRole::Student,
                text: "hi".to_string(),
                timestamp: "2024-05-10T12:00:00+00:00".to_string(),
            },
        };
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["payload"]["userName"], "Harry P.");
        assert_eq!(value["payload"]["userRole"], "STUDENT");
    }

    #[test]
    fn test_client_ping_parses() {
        assert!(matches!(
            serde_json::from_str::<WsMessage>(r#"{"type":"ping"}"#).unwrap(),
            WsMessage::Ping
        ));
    }
}
