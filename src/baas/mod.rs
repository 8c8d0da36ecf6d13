//! 托管后端（BaaS）协作接口
//!
//! 身份认证、关系存储、对象存储和实时推送都由托管平台提供，
//! 这里只定义门户需要的最小接口，以及两种实现：
//! - `supabase`: 通过 HTTP/WebSocket 访问托管平台
//! - `memory`: 进程内实现，用于本地运行和测试

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::BaasConfig;
use crate::errors::{PortalError, Result};
use crate::models::{
    auth::{AuthSession, AuthUser},
    chat::{ChatMessage, NewMessage},
    events::{CalendarEvent, NewEvent},
    materials::{Material, NewMaterial},
    students::{Student, StudentPayload},
};

pub mod memory;
pub mod rows;
pub mod supabase;

/// 身份认证
#[async_trait]
pub trait AuthProvider: Send + Sync {
    // 邮箱密码登录
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;
    // 通过 access token 获取用户，令牌无效时返回 None
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>>;
    // 刷新会话
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession>;
    // 注销
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// 关系存储（按实体划分的表操作）
#[async_trait]
pub trait Storage: Send + Sync {
    /// 资料
    // 按创建时间倒序列出
    async fn list_materials(&self) -> Result<Vec<Material>>;
    async fn insert_material(&self, material: NewMaterial) -> Result<Material>;
    async fn delete_material(&self, id: &str) -> Result<()>;

    /// 日程
    async fn list_events(&self) -> Result<Vec<CalendarEvent>>;
    async fn insert_event(&self, event: NewEvent) -> Result<CalendarEvent>;
    async fn delete_event(&self, id: &str) -> Result<()>;

    /// 聊天
    // 取最新的 limit 条而不是最早的，再按时间正序返回；历史超过上限时保留的是最近的对话
    async fn list_messages(&self, limit: usize) -> Result<Vec<ChatMessage>>;
    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage>;

    /// 学生名册
    async fn list_students(&self) -> Result<Vec<Student>>;
    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>>;
    async fn insert_student(&self, student: StudentPayload) -> Result<Student>;
    // 记录不存在时返回 None
    async fn update_student(&self, id: &str, student: StudentPayload) -> Result<Option<Student>>;
    async fn delete_student(&self, id: &str) -> Result<()>;
}

/// 对象存储
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    fn public_url(&self, key: &str) -> String;
}

/// 实时推送
#[async_trait]
pub trait RealtimeFeed: Send + Sync {
    // 订阅聊天消息表的插入事件
    async fn subscribe_messages(&self) -> Result<MessageSubscription>;
}

/// 聊天消息订阅
///
/// 持有期间接收新插入的消息；调用 `unsubscribe` 或被 drop 时释放底层订阅。
pub struct MessageSubscription {
    receiver: mpsc::Receiver<ChatMessage>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl MessageSubscription {
    pub fn new(
        receiver: mpsc::Receiver<ChatMessage>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// 等待下一条消息，订阅断开时返回 None
    pub async fn next(&mut self) -> Option<ChatMessage> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

type BearerScope = Arc<dyn Fn(&str) -> Backend + Send + Sync>;

/// 门户使用的全部托管后端能力
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn Storage>,
    pub objects: Arc<dyn ObjectStore>,
    pub realtime: Arc<dyn RealtimeFeed>,
    // 生成以调用者身份访问的视图
    scope: Option<BearerScope>,
}

impl Backend {
    /// 由同时实现全部接口的后端构造
    pub fn from_shared<T>(inner: Arc<T>) -> Self
    where
        T: AuthProvider + Storage + ObjectStore + RealtimeFeed + 'static,
    {
        Self {
            auth: inner.clone(),
            storage: inner.clone(),
            objects: inner.clone(),
            realtime: inner,
            scope: None,
        }
    }

    fn scoped_by(mut self, scope: impl Fn(&str) -> Backend + Send + Sync + 'static) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    /// 以调用者身份访问的视图；不区分调用者的后端返回自身
    pub fn with_bearer(&self, access_token: &str) -> Backend {
        match &self.scope {
            Some(scope) => scope(access_token),
            None => self.clone(),
        }
    }
}

/// 根据配置创建托管后端
pub async fn create_backend(config: &BaasConfig) -> Result<Backend> {
    match config.provider.as_str() {
        "supabase" => {
            let client = Arc::new(supabase::SupabaseClient::new(config)?);
            let template = client.clone();
            Ok(Backend::from_shared(client).scoped_by(move |token| {
                Backend::from_shared(Arc::new(template.with_bearer(token)))
            }))
        }
        "memory" => {
            warn!("Using in-memory backend; data is lost on restart");
            Ok(Backend::from_shared(Arc::new(
                memory::MemoryBackend::with_demo_accounts(),
            )))
        }
        other => Err(PortalError::backend_plugin_not_found(format!(
            "Unknown backend provider '{other}'. Supported: supabase, memory"
        ))),
    }
}
