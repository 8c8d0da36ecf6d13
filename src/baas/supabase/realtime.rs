//! Phoenix 协议的聊天消息实时订阅
//!
//! 每个订阅持有一条独立的 WebSocket 连接：
//! 加入 `realtime:public:messages` 频道，定时发送心跳，
//! 释放时发送 `phx_leave` 并关闭连接。

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::SupabaseClient;
use crate::baas::rows::{MESSAGES_TABLE, MessageRow};
use crate::baas::{MessageSubscription, RealtimeFeed};
use crate::errors::Result;
use crate::models::chat::ChatMessage;

const CHANNEL_TOPIC: &str = "realtime:public:messages";
const SUBSCRIPTION_BUFFER: usize = 64;

fn frame(topic: &str, event: &str, payload: Value, reference: u64) -> Message {
    let text = json!({
        "topic": topic,
        "event": event,
        "payload": payload,
        "ref": reference.to_string(),
    })
    .to_string();
    Message::Text(text.into())
}

fn join_frame(reference: u64, access_token: Option<&str>) -> Message {
    let mut payload = json!({
        "config": {
            "postgres_changes": [
                { "event": "INSERT", "schema": "public", "table": MESSAGES_TABLE }
            ]
        }
    });
    // 带上用户令牌，行级权限按该用户计算
    if let Some(token) = access_token {
        payload["access_token"] = Value::String(token.to_string());
    }
    frame(CHANNEL_TOPIC, "phx_join", payload, reference)
}

/// 从服务端推送帧中解析新插入的聊天消息
///
/// 非插入事件或记录格式不符时返回 None。
pub fn decode_insert(text: &str) -> Option<ChatMessage> {
    let value: Value = serde_json::from_str(text).ok()?;
    if value.get("event")?.as_str()? != "postgres_changes" {
        return None;
    }
    let data = value.get("payload")?.get("data")?;
    if data.get("type").and_then(Value::as_str) != Some("INSERT") {
        return None;
    }
    if data.get("table").and_then(Value::as_str) != Some(MESSAGES_TABLE) {
        return None;
    }
    let row: MessageRow = serde_json::from_value(data.get("record")?.clone()).ok()?;
    Some(row.into())
}

/// 服务端对加入请求的拒绝
fn join_error(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    if value.get("event")?.as_str()? != "phx_reply" {
        return None;
    }
    let payload = value.get("payload")?;
    if payload.get("status")?.as_str()? == "ok" {
        return None;
    }
    Some(payload.get("response").map(Value::to_string).unwrap_or_default())
}

#[async_trait]
impl RealtimeFeed for SupabaseClient {
    async fn subscribe_messages(&self) -> Result<MessageSubscription> {
        let (stream, _) = connect_async(self.realtime_url()).await?;
        let (mut sink, mut source) = stream.split();

        let mut reference = 1u64;
        sink.send(join_frame(reference, self.bearer.as_deref())).await?;
        info!("Joined realtime channel {}", CHANNEL_TOPIC);

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let mut heartbeat = tokio::time::interval(self.heartbeat);
        // 第一次 tick 立即完成，跳过
        heartbeat.tick().await;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        reference += 1;
                        let _ = sink.send(frame(CHANNEL_TOPIC, "phx_leave", json!({}), reference)).await;
                        let _ = sink.close().await;
                        debug!("Left realtime channel {}", CHANNEL_TOPIC);
                        break;
                    }
                    _ = heartbeat.tick() => {
                        reference += 1;
                        if let Err(e) = sink.send(frame("phoenix", "heartbeat", json!({}), reference)).await {
                            warn!("Realtime heartbeat failed: {}", e);
                            break;
                        }
                    }
                    incoming = source.next() => {
                        match incoming {
                            Some(Ok(Message::Text(text))) => {
                                if let Some(reason) = join_error(text.as_str()) {
                                    warn!("Realtime channel join rejected: {}", reason);
                                    break;
                                }
                                if let Some(message) = decode_insert(text.as_str())
                                    && tx.send(message).await.is_err()
                                {
                                    break;
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let _ = sink.send(Message::Pong(data)).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                info!("Realtime connection closed by server");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!("Realtime connection error: {}", e);
                                break;
                            }
                        }
                    }
                }
            }
        });

        Ok(MessageSubscription::new(rx, move || {
            let _ = shutdown_tx.send(());
        }))
    }
}
