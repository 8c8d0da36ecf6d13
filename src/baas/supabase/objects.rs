use async_trait::async_trait;
use bytes::Bytes;

use super::SupabaseClient;
use crate::baas::ObjectStore;
use crate::errors::{PortalError, Result};

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let url = self.endpoint(&format!(
            "/storage/v1/object/{}/{}",
            self.bucket,
            urlencoding::encode(key)
        ));
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data);
        Self::check(self.as_caller(request).send().await?)
            .await
            .map_err(|e| PortalError::object_storage(e.message().to_string()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.endpoint(&format!(
            "/storage/v1/object/public/{}/{}",
            self.bucket,
            urlencoding::encode(key)
        ))
    }
}
