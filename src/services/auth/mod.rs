pub mod login;
pub mod logout;
pub mod role_policy;
pub mod session;
pub mod token;

pub use role_policy::RolePolicy;
pub use session::{SessionEvent, SessionManager};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::{LoginRequest, RefreshRequest};

pub struct AuthService {
    sessions: Option<SessionManager>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { sessions: None }
    }

    pub(crate) fn get_sessions(&self, request: &HttpRequest) -> SessionManager {
        match &self.sessions {
            Some(sessions) => sessions.clone(),
            None => super::shared::<SessionManager>(request, "SessionManager"),
        }
    }

    // 登录
    pub async fn login(
        &self,
        login_request: LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    // 刷新会话
    pub async fn refresh(
        &self,
        refresh_request: RefreshRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        token::handle_refresh(self, refresh_request, request).await
    }

    // 当前用户
    pub async fn me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_me(request).await
    }

    // 注销
    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(self, request).await
    }
}
