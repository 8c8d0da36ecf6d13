/*!
 * 会话认证中间件
 *
 * 校验请求携带的托管身份服务 access token，确保只有已登录用户才能访问受保护的路由。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireSession;
 *
 * web::scope("/api/v1/materials")
 *     .wrap(RequireSession)
 *     .route("", web::get().to(list_materials));
 * ```
 *
 * 处理程序中提取用户：
 *
 * ```rust,ignore
 * if let Some(user) = RequireSession::extract_user(&req) {
 *     // user.role, user.email ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 客户端在请求头中包含 `Authorization: Bearer <ACCESS_TOKEN>`
 * 2. 中间件通过 `SessionManager` 查找会话（先查缓存，未命中再询问身份服务）
 * 3. 会话有效时将 `SessionContext` 存入请求扩展，继续处理请求
 * 4. 令牌无效或缺失时返回 401
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, error, info};

use super::create_error_response;
use crate::models::ErrorCode;
use crate::models::users::entities::PortalUser;
use crate::services::SessionManager;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

/// 请求扩展中的会话信息
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: PortalUser,
    pub access_token: String,
}

#[derive(Clone)]
pub struct RequireSession;

enum SessionFailure {
    Missing,
    Rejected,
    Backend(String),
}

async fn resolve_session(req: &ServiceRequest) -> Result<SessionContext, SessionFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SessionFailure::Missing)?;

    let sessions = req
        .app_data::<web::Data<SessionManager>>()
        .expect("SessionManager not found in app data")
        .get_ref()
        .clone();

    match sessions.establish(token).await {
        Ok(Some(user)) => Ok(SessionContext {
            user,
            access_token: token.to_string(),
        }),
        Ok(None) => Err(SessionFailure::Rejected),
        Err(e) => Err(SessionFailure::Backend(e.to_string())),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match resolve_session(&req).await {
                Ok(context) => {
                    debug!("Session established for user {}", context.user.id);
                    req.extensions_mut().insert(context);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    let (status, code, message) = match failure {
                        SessionFailure::Missing => (
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Missing or invalid Authorization header".to_string(),
                        ),
                        SessionFailure::Rejected => (
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::SessionExpired,
                            "Session expired, please sign in again".to_string(),
                        ),
                        SessionFailure::Backend(reason) => {
                            error!("Session lookup failed: {}", reason);
                            (
                                StatusCode::SERVICE_UNAVAILABLE,
                                ErrorCode::InternalServerError,
                                "Identity service unavailable".to_string(),
                            )
                        }
                    };
                    info!("Session check failed for request to {}: {}", req.path(), message);
                    Ok(req.into_response(
                        create_error_response(status, code, &message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取会话信息
impl RequireSession {
    /// 当前用户，需在应用了 RequireSession 的路由中使用
    pub fn extract_user(req: &HttpRequest) -> Option<PortalUser> {
        req.extensions()
            .get::<SessionContext>()
            .map(|context| context.user.clone())
    }

    /// 当前会话的 access token
    pub fn extract_token(req: &HttpRequest) -> Option<String> {
        req.extensions()
            .get::<SessionContext>()
            .map(|context| context.access_token.clone())
    }

    /// 未经中间件校验的 Bearer 令牌
    pub fn bearer_token(req: &HttpRequest) -> Option<String> {
        req.headers()
            .get(AUTHORIZATION_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
