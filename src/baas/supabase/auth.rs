use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::SupabaseClient;
use crate::baas::AuthProvider;
use crate::errors::Result;
use crate::models::auth::{AuthSession, AuthUser};

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = Self::check(self.authorized(request, None).send().await?).await?;
        Ok(response.json::<AuthSession>().await?)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let request = self.http.get(self.endpoint("/auth/v1/user"));
        let response = self.authorized(request, Some(access_token)).send().await?;

        // 令牌过期或被吊销
        if matches!(
            response.status(),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            debug!("Access token rejected by identity service");
            return Ok(None);
        }

        let response = Self::check(response).await?;
        Ok(Some(response.json::<AuthUser>().await?))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let response = Self::check(self.authorized(request, None).send().await?).await?;
        Ok(response.json::<AuthSession>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self.http.post(self.endpoint("/auth/v1/logout"));
        Self::check(self.authorized(request, Some(access_token)).send().await?).await?;
        Ok(())
    }
}
