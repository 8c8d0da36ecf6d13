use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::AuthService;
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode};

pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(token) = RequireSession::extract_token(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    // 本地会话已移除，托管服务注销失败只记录
    if let Err(e) = service.get_sessions(request).sign_out(&token).await {
        warn!("Identity service sign-out failed: {}", e);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Logged out successfully")))
}
