use crate::domain::ports::ObjectStorage;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

/// Bucket-based blob storage over the hosting platform's storage REST
/// API.
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl HttpObjectStorage {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn connection_error(context: &str, e: reqwest::Error) -> AppError {
        let msg = format!("Storage {} connection error: {}", context, e);
        error!("{}", msg);
        AppError::InternalWithMsg(msg)
    }

    fn status_error(context: &str, status: reqwest::StatusCode) -> AppError {
        let msg = format!("Storage {} failed. Status: {}", context, status);
        error!("{}", msg);
        AppError::InternalWithMsg(msg)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), AppError> {
        let url = format!("{}/object/{}/{}", self.base_url, bucket, path);
        let res = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", content_type.unwrap_or("application/octet-stream"))
            .body(bytes)
            .send()
            .await
            .map_err(|e| Self::connection_error("upload", e))?;

        if !res.status().is_success() {
            return Err(Self::status_error("upload", res.status()));
        }
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/object/{}/{}", self.base_url, bucket, path);
        let res = self.client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| Self::connection_error("download", e))?;

        if !res.status().is_success() {
            return Err(Self::status_error("download", res.status()));
        }

        let bytes = res.bytes().await.map_err(|e| Self::connection_error("download body", e))?;
        Ok(bytes.to_vec())
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u32) -> Result<String, AppError> {
        let url = format!("{}/object/sign/{}/{}", self.base_url, bucket, path);
        let res = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "expiresIn": ttl_secs }))
            .send()
            .await
            .map_err(|e| Self::connection_error("sign", e))?;

        if !res.status().is_success() {
            return Err(Self::status_error("sign", res.status()));
        }

        let body: SignedUrlResponse = res
            .json()
            .await
            .map_err(|e| Self::connection_error("sign body", e))?;
        Ok(format!("{}{}", self.base_url, body.signed_url))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError> {
        let url = format!("{}/object/{}", self.base_url, bucket);
        let res = self.client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(|e| Self::connection_error("remove", e))?;

        if !res.status().is_success() {
            return Err(Self::status_error("remove", res.status()));
        }
        Ok(())
    }
}
