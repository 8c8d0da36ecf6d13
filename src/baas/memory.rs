//! 进程内托管后端
//!
//! 行为与托管平台保持一致：服务端生成 id 和创建时间，消息插入后推送给所有订阅者。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::{AuthProvider, MessageSubscription, ObjectStore, RealtimeFeed, Storage};
use crate::errors::{PortalError, Result};
use crate::models::{
    auth::{AuthSession, AuthUser, UserMetadata},
    chat::{ChatMessage, NewMessage},
    events::{CalendarEvent, NewEvent},
    materials::{Material, NewMaterial},
    students::{Student, StudentPayload},
};

const ACCESS_TOKEN_TTL_SECS: i64 = 3600;
const SUBSCRIBER_BUFFER: usize = 64;
const PUBLIC_URL_BASE: &str = "memory://objects";

struct MemoryAccount {
    password: String,
    user: AuthUser,
}

#[derive(Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

type Subscribers = DashMap<u64, mpsc::Sender<ChatMessage>>;

#[derive(Default)]
pub struct MemoryBackend {
    // 邮箱 -> 账号
    accounts: DashMap<String, MemoryAccount>,
    // access token -> 用户
    sessions: DashMap<String, AuthUser>,
    // refresh token -> 用户
    refresh_tokens: DashMap<String, AuthUser>,
    materials: RwLock<Vec<Material>>,
    events: RwLock<Vec<CalendarEvent>>,
    messages: RwLock<Vec<ChatMessage>>,
    students: RwLock<Vec<Student>>,
    objects: DashMap<String, StoredObject>,
    subscribers: Arc<Subscribers>,
    next_subscriber: AtomicU64,
    roster_reads: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置演示账号：一名教师、一名学生
    pub fn with_demo_accounts() -> Self {
        let backend = Self::new();
        backend.add_account(
            "u-teacher-1",
            "professor@example.com",
            "prof123",
            UserMetadata {
                name: Some("Prof. Albus D.".to_string()),
                role: Some("TEACHER".to_string()),
            },
        );
        backend.add_account(
            "u-student-1",
            "aluno@example.com",
            "aluno123",
            UserMetadata {
                name: Some("Harry P.".to_string()),
                role: Some("STUDENT".to_string()),
            },
        );
        backend
    }

    pub fn add_account(&self, id: &str, email: &str, password: &str, metadata: UserMetadata) {
        self.accounts.insert(
            email.to_string(),
            MemoryAccount {
                password: password.to_string(),
                user: AuthUser {
                    id: id.to_string(),
                    email: Some(email.to_string()),
                    user_metadata: metadata,
                },
            },
        );
    }

    /// 当前活跃的实时订阅数
    pub fn active_subscriptions(&self) -> usize {
        self.subscribers.len()
    }

    /// 学生名册被整表读取的次数
    pub fn roster_reads(&self) -> usize {
        self.roster_reads.load(Ordering::Relaxed)
    }

    pub fn stored_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|o| o.clone())
    }

    fn issue_session(&self, user: AuthUser) -> AuthSession {
        let access_token = Uuid::new_v4().to_string();
        let refresh_token = Uuid::new_v4().to_string();
        self.sessions.insert(access_token.clone(), user.clone());
        self.refresh_tokens.insert(refresh_token.clone(), user.clone());
        AuthSession {
            access_token,
            refresh_token,
            expires_in: ACCESS_TOKEN_TTL_SECS,
            user,
        }
    }

    fn notify_subscribers(&self, message: &ChatMessage) {
        for entry in self.subscribers.iter() {
            // 订阅者处理不过来时直接丢弃
            if entry.value().try_send(message.clone()).is_err() {
                debug!("Dropping realtime message for subscriber {}", entry.key());
            }
        }
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let user = match self.accounts.get(email) {
            Some(account) if account.password == password => account.user.clone(),
            _ => return Err(PortalError::authentication("Invalid login credentials")),
        };
        Ok(self.issue_session(user))
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        Ok(self.sessions.get(access_token).map(|u| u.clone()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let (_, user) = self
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| PortalError::authentication("Invalid refresh token"))?;
        Ok(self.issue_session(user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.sessions.remove(access_token);
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryBackend {
    async fn list_materials(&self) -> Result<Vec<Material>> {
        let materials = self.materials.read().expect("Materials lock poisoned");
        let mut items = materials.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_material(&self, material: NewMaterial) -> Result<Material> {
        let created = Material {
            id: new_id(),
            title: material.title,
            description: material.description,
            subject: material.subject,
            kind: material.kind,
            url: material.url,
            created_at: now_iso(),
            uploaded_by: material.uploaded_by,
        };
        self.materials
            .write()
            .expect("Materials lock poisoned")
            .push(created.clone());
        Ok(created)
    }

    async fn delete_material(&self, id: &str) -> Result<()> {
        self.materials
            .write()
            .expect("Materials lock poisoned")
            .retain(|m| m.id != id);
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        Ok(self.events.read().expect("Events lock poisoned").clone())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<CalendarEvent> {
        let created = CalendarEvent {
            id: new_id(),
            title: event.title,
            description: event.description,
            start: event.start,
            end: event.end,
            category: event.category,
            subject: event.subject,
            created_by: event.created_by,
        };
        self.events
            .write()
            .expect("Events lock poisoned")
            .push(created.clone());
        Ok(created)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        self.events
            .write()
            .expect("Events lock poisoned")
            .retain(|e| e.id != id);
        Ok(())
    }

    async fn list_messages(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let messages = self.messages.read().expect("Messages lock poisoned");
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.iter().skip(skip).cloned().collect())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage> {
        let created = ChatMessage {
            id: new_id(),
            user_id: message.user_id,
            user_name: message.user_name,
            user_role: message.user_role,
            text: message.text,
            timestamp: message.timestamp,
        };
        self.messages
            .write()
            .expect("Messages lock poisoned")
            .push(created.clone());
        self.notify_subscribers(&created);
        Ok(created)
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        self.roster_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.students.read().expect("Students lock poisoned").clone())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        Ok(self
            .students
            .read()
            .expect("Students lock poisoned")
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn insert_student(&self, student: StudentPayload) -> Result<Student> {
        let created = Student {
            id: new_id(),
            name: student.name,
            email: student.email,
            class: student.class,
        };
        self.students
            .write()
            .expect("Students lock poisoned")
            .push(created.clone());
        Ok(created)
    }

    async fn update_student(&self, id: &str, student: StudentPayload) -> Result<Option<Student>> {
        let mut students = self.students.write().expect("Students lock poisoned");
        Ok(students.iter_mut().find(|s| s.id == id).map(|existing| {
            existing.name = student.name;
            existing.email = student.email;
            existing.class = student.class;
            existing.clone()
        }))
    }

    async fn delete_student(&self, id: &str) -> Result<()> {
        self.students
            .write()
            .expect("Students lock poisoned")
            .retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        if self.objects.contains_key(key) {
            return Err(PortalError::object_storage(format!(
                "Object '{key}' already exists"
            )));
        }
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{PUBLIC_URL_BASE}/{key}")
    }
}

#[async_trait]
impl RealtimeFeed for MemoryBackend {
    async fn subscribe_messages(&self) -> Result<MessageSubscription> {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.insert(id, tx);

        let subscribers = self.subscribers.clone();
        Ok(MessageSubscription::new(rx, move || {
            subscribers.remove(&id);
            debug!("Released in-memory realtime subscription {}", id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn sample_message(text: &str) -> NewMessage {
        NewMessage {
            user_id: "u1".into(),
            user_name: "Harry P.".into(),
            user_role: UserRole::Student,
            text: text.into(),
            timestamp: now_iso(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_sign_out() {
        let backend = MemoryBackend::with_demo_accounts();
        assert!(
            backend
                .sign_in_with_password("professor@example.com", "wrong")
                .await
                .is_err()
        );

        let session = backend
            .sign_in_with_password("professor@example.com", "prof123")
            .await
            .unwrap();
        let user = backend.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.unwrap().id, "u-teacher-1");

        backend.sign_out(&session.access_token).await.unwrap();
        assert!(
            backend
                .get_user(&session.access_token)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let backend = MemoryBackend::with_demo_accounts();
        let session = backend
            .sign_in_with_password("aluno@example.com", "aluno123")
            .await
            .unwrap();
        let refreshed = backend
            .refresh_session(&session.refresh_token)
            .await
            .unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(
            backend
                .refresh_session(&session.refresh_token)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_list_messages_returns_latest_in_order() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend
                .insert_message(sample_message(&format!("m{i}")))
                .await
                .unwrap();
        }
        let texts: Vec<String> = backend
            .list_messages(3)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_subscription_receives_inserts_and_releases() {
        let backend = MemoryBackend::new();
        let mut subscription = backend.subscribe_messages().await.unwrap();
        assert_eq!(backend.active_subscriptions(), 1);

        backend.insert_message(sample_message("hi")).await.unwrap();
        let received = subscription.next().await.unwrap();
        assert_eq!(received.text, "hi");

        subscription.unsubscribe();
        assert_eq!(backend.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_duplicate_key() {
        let backend = MemoryBackend::new();
        backend
            .upload("a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        assert!(
            backend
                .upload("a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
                .await
                .is_err()
        );
        assert_eq!(backend.public_url("a.pdf"), "memory://objects/a.pdf");
    }
}
