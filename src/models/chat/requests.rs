use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

// WebSocket 连接参数（浏览器无法为 WebSocket 设置请求头）
#[derive(Debug, Deserialize)]
pub struct ChatStreamQuery {
    pub token: String,
}
