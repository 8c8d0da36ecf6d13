//! Supabase 托管后端
//!
//! - 身份认证：GoTrue `/auth/v1`
//! - 关系存储：PostgREST `/rest/v1`
//! - 对象存储：`/storage/v1`
//! - 实时推送：Phoenix WebSocket `/realtime/v1/websocket`

mod auth;
mod objects;
mod realtime;
mod rest;

pub use realtime::decode_insert;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::info;

use crate::config::BaasConfig;
use crate::errors::{PortalError, Result};

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
    bucket: String,
    heartbeat: Duration,
    // 调用者的 access token，表与存储请求以该身份执行
    bearer: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &BaasConfig) -> Result<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(PortalError::backend_config(format!(
                "Supabase URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        if config.anon_key.is_empty() {
            return Err(PortalError::backend_config("Supabase API key is missing"));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PortalError::backend_config(format!("HTTP client init failed: {e}")))?;

        info!("Supabase backend configured for {}", base_url);

        Ok(Self {
            http,
            base_url,
            api_key: config.anon_key.clone(),
            bucket: config.materials_bucket.clone(),
            heartbeat: Duration::from_secs(config.realtime_heartbeat_secs.max(1)),
            bearer: None,
        })
    }

    /// 以登录用户身份访问的副本
    pub fn with_bearer(&self, access_token: &str) -> Self {
        Self {
            bearer: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 附加项目密钥；bearer 为空时使用项目密钥本身
    fn authorized(&self, builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    /// 表与存储请求：有调用者令牌时使用该令牌
    fn as_caller(&self, builder: RequestBuilder) -> RequestBuilder {
        self.authorized(builder, self.bearer.as_deref())
    }

    /// 非 2xx 响应转换为错误，保留服务端返回的消息
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = format!("{status}: {body}");
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST && body.contains("invalid_grant")
        {
            Err(PortalError::authentication(message))
        } else {
            Err(PortalError::backend_request(message))
        }
    }

    fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            urlencoding::encode(&self.api_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::{ObjectStore, Storage, create_backend};
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use std::sync::{Arc, Mutex};

    // (apikey, authorization)
    type SeenHeaders = Arc<Mutex<Vec<(String, String)>>>;

    async fn record_headers(req: HttpRequest, seen: web::Data<SeenHeaders>) -> HttpResponse {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        seen.lock()
            .unwrap()
            .push((header("apikey"), header("authorization")));
        HttpResponse::Ok().json(Vec::<serde_json::Value>::new())
    }

    /// 本地替身服务，记录每个请求的鉴权头
    fn header_recorder() -> (String, SeenHeaders) {
        let seen = SeenHeaders::default();
        let data = web::Data::new(seen.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(record_headers))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        (format!("http://{addr}"), seen)
    }

    fn last_seen(seen: &SeenHeaders) -> (String, String) {
        seen.lock().unwrap().last().cloned().unwrap()
    }

    fn config(url: &str, key: &str) -> BaasConfig {
        BaasConfig {
            provider: "supabase".to_string(),
            url: url.to_string(),
            anon_key: key.to_string(),
            ..BaasConfig::default()
        }
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(SupabaseClient::new(&config("project.supabase.co", "key")).is_err());
        assert!(SupabaseClient::new(&config("https://project.supabase.co", "")).is_err());
    }

    #[test]
    fn test_endpoints() {
        let client = SupabaseClient::new(&config("https://project.supabase.co/", "anon")).unwrap();
        assert_eq!(
            client.endpoint("/rest/v1/materials"),
            "https://project.supabase.co/rest/v1/materials"
        );
        assert_eq!(
            client.realtime_url(),
            "wss://project.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[actix_web::test]
    async fn test_table_calls_carry_caller_token() {
        let (url, seen) = header_recorder();
        let client = SupabaseClient::new(&config(&url, "anon")).unwrap();

        client.list_materials().await.unwrap();
        assert_eq!(last_seen(&seen), ("anon".to_string(), "Bearer anon".to_string()));

        let caller = client.with_bearer("user-jwt");
        caller.list_materials().await.unwrap();
        assert_eq!(
            last_seen(&seen),
            ("anon".to_string(), "Bearer user-jwt".to_string())
        );

        caller
            .upload("notes.pdf", bytes::Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(last_seen(&seen).1, "Bearer user-jwt");
    }

    #[actix_web::test]
    async fn test_backend_view_uses_caller_token() {
        let (url, seen) = header_recorder();
        let backend = create_backend(&config(&url, "anon")).await.unwrap();

        backend.with_bearer("student-jwt").storage.list_students().await.unwrap();
        assert_eq!(last_seen(&seen).1, "Bearer student-jwt");

        backend.storage.list_events().await.unwrap();
        assert_eq!(last_seen(&seen).1, "Bearer anon");
    }
}
