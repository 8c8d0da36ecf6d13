//! 进程内聊天通知总线
//!
//! 发布即忘：发布时尚未订阅的接收方收不到通知，落后太多的订阅方丢弃旧通知。
//! `close` 之后不再接受发布和订阅，已有订阅随之结束。

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::models::chat::ChatMessage;

const BUS_CAPACITY: usize = 256;

/// 有新聊天消息写入
#[derive(Debug, Clone, PartialEq)]
pub struct ChatNotification {
    pub message_id: String,
    pub user_id: String,
    pub user_name: String,
}

impl From<&ChatMessage> for ChatNotification {
    fn from(message: &ChatMessage) -> Self {
        Self {
            message_id: message.id.clone(),
            user_id: message.user_id.clone(),
            user_name: message.user_name.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NotificationBus {
    sender: Arc<RwLock<Option<broadcast::Sender<ChatNotification>>>>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            sender: Arc::new(RwLock::new(Some(sender))),
        }
    }

    /// 发布通知，返回收到通知的订阅数
    pub fn publish(&self, notification: ChatNotification) -> usize {
        let guard = self.sender.read().expect("Notification bus lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender.send(notification).unwrap_or(0),
            None => {
                debug!("Notification dropped: bus is closed");
                0
            }
        }
    }

    /// 总线关闭后返回 None
    pub fn subscribe(&self) -> Option<BusSubscription> {
        self.sender
            .read()
            .expect("Notification bus lock poisoned")
            .as_ref()
            .map(|sender| BusSubscription {
                receiver: sender.subscribe(),
            })
    }

    pub fn close(&self) {
        if self
            .sender
            .write()
            .expect("Notification bus lock poisoned")
            .take()
            .is_some()
        {
            debug!("Notification bus closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .expect("Notification bus lock poisoned")
            .is_none()
    }
}

pub struct BusSubscription {
    receiver: broadcast::Receiver<ChatNotification>,
}

impl BusSubscription {
    /// 取出当前积压的全部通知（不等待），返回数量
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(_) => received += 1,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Notification subscriber lagged by {} messages", skipped);
                    received += skipped as usize;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        received
    }

    /// 异步等待下一条通知，总线关闭时返回 None
    pub async fn recv(&mut self) -> Option<ChatNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Notification subscriber lagged by {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
