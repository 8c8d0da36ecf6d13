use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AuthService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};

// 登录失败统一提示，不区分账号不存在与密码错误
pub(crate) const LOGIN_FAILED_MESSAGE: &str = "Login failed. Check your email and password.";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = login_request.email.trim();
    if email.is_empty() || login_request.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Email and password are required",
        )));
    }

    let sessions = service.get_sessions(request);
    match sessions.sign_in(email, &login_request.password).await {
        Ok((session, user)) => {
            let response = LoginResponse {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_in: session.expires_in,
                user,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            if e.code() == "E012" {
                info!("Login rejected for {}: {}", email, e.message());
            } else {
                error!("Login failed for {}: {}", email, e);
            }
            Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                LOGIN_FAILED_MESSAGE,
            )))
        }
    }
}
