use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginResponse, RefreshRequest},
};

pub async fn handle_refresh(
    service: &AuthService,
    refresh_request: RefreshRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if refresh_request.refresh_token.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Refresh token is required",
        )));
    }

    // 带着旧的 access token 时一并失效
    let previous = RequireSession::bearer_token(request);
    let sessions = service.get_sessions(request);
    match sessions
        .refresh(refresh_request.refresh_token.trim(), previous.as_deref())
        .await
    {
        Ok((session, user)) => {
            let response = LoginResponse {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_in: session.expires_in,
                user,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Session refreshed")))
        }
        Err(e) => {
            info!("Session refresh rejected: {}", e);
            Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::SessionExpired,
                "Session expired, please sign in again",
            )))
        }
    }
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    match RequireSession::extract_user(request) {
        Some(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user, "Current user"))),
        None => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))),
    }
}
