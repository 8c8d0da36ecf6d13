use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::notifications::ShellRegistry;
use crate::middlewares::RequireSession;
use crate::models::users::entities::PortalUser;
use crate::models::{
    ApiResponse, ErrorCode,
    shell::{NavigateRequest, OpenShellRequest},
};

pub struct ShellService {
    registry: Option<ShellRegistry>,
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Authentication required",
    ))
}

fn shell_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ShellNotFound,
        "Shell not found",
    ))
}

impl ShellService {
    pub fn new_lazy() -> Self {
        Self { registry: None }
    }

    pub(crate) fn get_registry(&self, request: &HttpRequest) -> ShellRegistry {
        match &self.registry {
            Some(registry) => registry.clone(),
            None => super::shared::<ShellRegistry>(request, "ShellRegistry"),
        }
    }

    fn current_user(request: &HttpRequest) -> Option<PortalUser> {
        RequireSession::extract_user(request)
    }

    pub async fn open(
        &self,
        open_request: OpenShellRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let Some(user) = Self::current_user(request) else {
            return Ok(unauthorized());
        };
        let opened = self
            .get_registry(request)
            .open(&user, open_request.path.as_deref());
        Ok(HttpResponse::Ok().json(ApiResponse::success(opened, "Shell opened")))
    }

    pub async fn state(&self, shell_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let Some(user) = Self::current_user(request) else {
            return Ok(unauthorized());
        };
        match self.get_registry(request).state(shell_id, &user.id) {
            Some(state) => Ok(HttpResponse::Ok().json(ApiResponse::success(state, "Shell state"))),
            None => Ok(shell_not_found()),
        }
    }

    pub async fn navigate(
        &self,
        shell_id: &str,
        navigate_request: NavigateRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let Some(user) = Self::current_user(request) else {
            return Ok(unauthorized());
        };
        let path = navigate_request.path.trim();
        if !path.starts_with('/') {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "View path must start with '/'",
            )));
        }
        match self.get_registry(request).navigate(shell_id, &user.id, path) {
            Some(state) => Ok(HttpResponse::Ok().json(ApiResponse::success(state, "View changed"))),
            None => Ok(shell_not_found()),
        }
    }

    pub async fn close(&self, shell_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let Some(user) = Self::current_user(request) else {
            return Ok(unauthorized());
        };
        if self.get_registry(request).close(shell_id, &user.id) {
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Shell closed")))
        } else {
            Ok(shell_not_found())
        }
    }
}
