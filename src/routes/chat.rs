use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::chat::{ChatStreamQuery, SendMessageRequest};
use crate::services::ChatService;
use crate::services::websocket::ChatStreamService;

// 懒加载的全局 ChatService 实例
static CHAT_SERVICE: Lazy<ChatService> = Lazy::new(ChatService::new_lazy);

pub async fn list_messages(req: HttpRequest) -> ActixResult<HttpResponse> {
    CHAT_SERVICE.history(&req).await
}

pub async fn send_message(
    req: HttpRequest,
    message_data: web::Json<SendMessageRequest>,
) -> ActixResult<HttpResponse> {
    CHAT_SERVICE.send(message_data.into_inner(), &req).await
}

// WebSocket 令牌通过查询参数传入，不经过会话中间件
pub async fn chat_stream(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<ChatStreamQuery>,
) -> ActixResult<HttpResponse> {
    ChatStreamService::connect(req, body, query.into_inner()).await
}

// 配置路由
pub fn configure_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/chat")
            .route("/ws", web::get().to(chat_stream))
            .service(
                web::resource("/messages")
                    .wrap(middlewares::RequireSession)
                    .route(web::get().to(list_messages))
                    .route(web::post().to(send_message)),
            ),
    );
}
