//! 会话管理
//!
//! 持有 access token 到门户用户的映射。生命周期：
//! - 登录或首次携带令牌请求时建立
//! - 刷新令牌时更新（`SessionEvent::Refreshed`）
//! - 注销时移除（`SessionEvent::SignedOut`）

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::role_policy::RolePolicy;
use crate::baas::{AuthProvider, Backend, Storage};
use crate::config::{PortalConfig, SessionConfig};
use crate::errors::Result;
use crate::models::auth::{AuthSession, AuthUser};
use crate::models::students::StudentPayload;
use crate::models::users::entities::{PortalUser, UserRole};

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";
const FALLBACK_NAME: &str = "User";
const SESSION_EVENT_BUFFER: usize = 64;

/// 会话变化事件
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(PortalUser),
    Refreshed(PortalUser),
    SignedOut { user_id: String },
}

#[derive(Clone)]
pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    backend: Backend,
    policy: RolePolicy,
    default_student_class: String,
    sessions: Cache<String, PortalUser>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(backend: &Backend, portal: &PortalConfig, session: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(session.max_sessions)
            .time_to_live(Duration::from_secs(session.cache_ttl_secs))
            .build();
        let (events, _) = broadcast::channel(SESSION_EVENT_BUFFER);

        debug!(
            "SessionManager initialized with capacity {} and ttl {}s",
            session.max_sessions, session.cache_ttl_secs
        );

        Self {
            auth: backend.auth.clone(),
            backend: backend.clone(),
            policy: RolePolicy::from_config(portal),
            default_student_class: portal.default_student_class.clone(),
            sessions,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // 没有订阅者时发送失败，忽略
        let _ = self.events.send(event);
    }

    /// 托管身份服务的用户映射为门户用户
    pub fn map_user(&self, user: &AuthUser) -> PortalUser {
        let email = user.email.clone().unwrap_or_default();
        let name = display_name(user.user_metadata.name.as_deref(), &email);
        let role = self
            .policy
            .resolve(&email, user.user_metadata.role.as_deref());

        PortalUser {
            id: user.id.clone(),
            avatar: Some(avatar_url(&name)),
            name,
            email,
            role,
        }
    }

    /// 邮箱密码登录
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(AuthSession, PortalUser)> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        let user = self.admit(&session.access_token, &session.user).await;
        info!("User {} signed in as {}", user.email, user.role);
        self.publish(SessionEvent::SignedIn(user.clone()));
        Ok((session, user))
    }

    /// 通过 access token 恢复会话，令牌无效时返回 None
    pub async fn establish(&self, access_token: &str) -> Result<Option<PortalUser>> {
        if let Some(user) = self.sessions.get(access_token).await {
            return Ok(Some(user));
        }

        match self.auth.get_user(access_token).await? {
            Some(auth_user) => Ok(Some(self.admit(access_token, &auth_user).await)),
            None => Ok(None),
        }
    }

    /// 刷新会话，旧的 access token 不再映射
    pub async fn refresh(
        &self,
        refresh_token: &str,
        previous_access_token: Option<&str>,
    ) -> Result<(AuthSession, PortalUser)> {
        let session = self.auth.refresh_session(refresh_token).await?;
        if let Some(previous) = previous_access_token {
            self.sessions.invalidate(previous).await;
        }
        let user = self.admit(&session.access_token, &session.user).await;
        debug!("Session refreshed for user {}", user.id);
        self.publish(SessionEvent::Refreshed(user.clone()));
        Ok((session, user))
    }

    /// 注销：本地映射总是移除，托管服务的注销失败会返回错误
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let user = self.sessions.get(access_token).await;
        self.sessions.invalidate(access_token).await;

        let result = self.auth.sign_out(access_token).await;
        if let Some(user) = user {
            info!("User {} signed out", user.email);
            self.publish(SessionEvent::SignedOut { user_id: user.id });
        }
        result
    }

    async fn admit(&self, access_token: &str, auth_user: &AuthUser) -> PortalUser {
        let user = self.map_user(auth_user);
        self.sessions
            .insert(access_token.to_string(), user.clone())
            .await;
        if user.role == UserRole::Student {
            self.sync_student(access_token, &user);
        }
        user
    }

    /// 学生登录后确保名册中存在对应记录，不等待结果
    fn sync_student(&self, access_token: &str, user: &PortalUser) {
        let storage = self.backend.with_bearer(access_token).storage;
        let payload = StudentPayload {
            name: user.name.clone(),
            email: user.email.clone(),
            class: self.default_student_class.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = ensure_student_row(storage.as_ref(), payload).await {
                warn!("Student roster sync failed: {}", e);
            }
        });
    }
}

/// 名册中没有该邮箱时插入，返回是否插入
pub async fn ensure_student_row(storage: &dyn Storage, payload: StudentPayload) -> Result<bool> {
    if payload.email.is_empty() {
        return Ok(false);
    }
    if storage.find_student_by_email(&payload.email).await?.is_some() {
        return Ok(false);
    }
    let created = storage.insert_student(payload).await?;
    info!("Added {} to the student roster", created.email);
    Ok(true)
}

/// 元数据中的名字，否则取邮箱 @ 前部分
pub fn display_name(metadata_name: Option<&str>, email: &str) -> String {
    if let Some(name) = metadata_name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => FALLBACK_NAME.to_string(),
    }
}

pub fn avatar_url(name: &str) -> String {
    format!(
        "{AVATAR_SERVICE}?name={}&background=random",
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryBackend;
    use crate::models::auth::UserMetadata;

    fn manager() -> (Arc<MemoryBackend>, SessionManager) {
        let memory = Arc::new(MemoryBackend::with_demo_accounts());
        let backend = Backend::from_shared(memory.clone());
        let manager = SessionManager::new(
            &backend,
            &PortalConfig::default(),
            &SessionConfig::default(),
        );
        (memory, manager)
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(display_name(Some("Ana Souza"), "ana@x.org"), "Ana Souza");
        assert_eq!(display_name(Some("  "), "ana@x.org"), "ana");
        assert_eq!(display_name(None, ""), "User");
    }

    #[test]
    fn test_avatar_url_encodes_name() {
        assert_eq!(
            avatar_url("Prof. Albus D."),
            "https://ui-avatars.com/api/?name=Prof.%20Albus%20D.&background=random"
        );
    }

    #[tokio::test]
    async fn test_map_user_uses_metadata_and_heuristic() {
        let (_, manager) = manager();
        let user = manager.map_user(&AuthUser {
            id: "u-9".to_string(),
            email: Some("prof.x@school.org".to_string()),
            user_metadata: UserMetadata::default(),
        });
        assert_eq!(user.name, "prof.x");
        assert_eq!(user.role, UserRole::Teacher);

        let claimed = manager.map_user(&AuthUser {
            id: "u-10".to_string(),
            email: Some("prof.y@school.org".to_string()),
            user_metadata: UserMetadata {
                name: Some("Yara".to_string()),
                role: Some("STUDENT".to_string()),
            },
        });
        assert_eq!(claimed.role, UserRole::Student);
    }

    #[tokio::test]
    async fn test_session_lifecycle_events() {
        let (_, manager) = manager();
        let mut events = manager.subscribe();

        let (session, user) = manager
            .sign_in("professor@example.com", "prof123")
            .await
            .unwrap();
        assert!(user.is_teacher());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn(user.clone()));

        let established = manager.establish(&session.access_token).await.unwrap();
        assert_eq!(established, Some(user.clone()));

        let (refreshed, _) = manager
            .refresh(&session.refresh_token, Some(&session.access_token))
            .await
            .unwrap();
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::Refreshed(_)));

        manager.sign_out(&refreshed.access_token).await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut { user_id: user.id }
        );
        assert!(manager.establish(&refreshed.access_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let (_, manager) = manager();
        let err = manager
            .sign_in("professor@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[tokio::test]
    async fn test_ensure_student_row_is_idempotent() {
        let (memory, _) = manager();
        let payload = StudentPayload {
            name: "Harry P.".to_string(),
            email: "aluno@example.com".to_string(),
            class: "New Enrollment".to_string(),
        };
        assert!(ensure_student_row(memory.as_ref(), payload.clone()).await.unwrap());
        assert!(!ensure_student_row(memory.as_ref(), payload).await.unwrap());
        assert_eq!(memory.list_students().await.unwrap().len(), 1);
    }
}
