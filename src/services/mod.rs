pub mod auth;
pub mod calendar;
pub mod chat;
pub mod dashboard;
pub mod events;
pub mod materials;
pub mod notifications;
pub mod shell;
pub mod students;
pub mod websocket;

pub use auth::{AuthService, RolePolicy, SessionEvent, SessionManager};
pub use calendar::CalendarService;
pub use chat::ChatService;
pub use dashboard::DashboardService;
pub use events::EventService;
pub use materials::MaterialService;
pub use notifications::{NotificationBus, ShellRegistry, UnreadIndicator};
pub use shell::ShellService;
pub use students::StudentService;

use actix_web::{HttpRequest, web};

use crate::baas::Backend;
use crate::middlewares::RequireSession;

/// 从 app_data 中取出共享状态
pub(crate) fn shared<T: Clone + 'static>(request: &HttpRequest, name: &str) -> T {
    request
        .app_data::<web::Data<T>>()
        .unwrap_or_else(|| panic!("{name} not found in app data"))
        .get_ref()
        .clone()
}

/// 各资源服务共用的后端获取逻辑，已登录的请求以调用者身份访问
pub(crate) fn resolve_backend(preset: &Option<Backend>, request: &HttpRequest) -> Backend {
    let backend = match preset {
        Some(backend) => backend.clone(),
        None => shared::<Backend>(request, "Backend"),
    };
    match RequireSession::extract_token(request) {
        Some(token) => backend.with_bearer(&token),
        None => backend,
    }
}
