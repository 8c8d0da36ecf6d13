use std::time::Duration;

use actix_web::web;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::baas::{Backend, create_backend};
use crate::config::AppConfig;
use crate::services::{NotificationBus, SessionEvent, SessionManager, ShellRegistry};

#[derive(Clone)]
pub struct StartupContext {
    pub backend: Backend,
    pub sessions: SessionManager,
    pub bus: NotificationBus,
    pub shells: ShellRegistry,
}

impl StartupContext {
    /// 注册为 App 共享数据
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.backend.clone()))
            .app_data(web::Data::new(self.sessions.clone()))
            .app_data(web::Data::new(self.bus.clone()))
            .app_data(web::Data::new(self.shells.clone()));
    }
}

/// 注销时关闭该用户打开的全部外壳
fn spawn_session_listener(sessions: &SessionManager, shells: ShellRegistry) {
    let mut events = sessions.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedOut { user_id }) => {
                    let closed = shells.close_all_for(&user_id);
                    if closed > 0 {
                        info!("Closed {} shell(s) for signed out user {}", closed, user_id);
                    }
                }
                Ok(SessionEvent::SignedIn(user)) | Ok(SessionEvent::Refreshed(user)) => {
                    debug!("Session active for user {}", user.id);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session listener lagged, skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// 准备服务器启动的上下文
/// 包括托管后端、会话管理与通知总线
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    let backend = create_backend(&config.baas)
        .await
        .expect("Failed to create backend");
    warn!("Backend '{}' initialized", config.baas.provider);

    let sessions = SessionManager::new(&backend, &config.portal, &config.session);
    let bus = NotificationBus::new();
    let shells = ShellRegistry::new(
        bus.clone(),
        Duration::from_secs(config.session.shell_idle_secs),
    );
    spawn_session_listener(&sessions, shells.clone());
    warn!("Session manager and notification bus initialized");

    StartupContext {
        backend,
        sessions,
        bus,
        shells,
    }
}
