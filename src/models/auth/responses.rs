use serde::Serialize;

use crate::models::users::entities::PortalUser;

// 登录/刷新响应
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: PortalUser,
}
