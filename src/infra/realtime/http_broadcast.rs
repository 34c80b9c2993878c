use crate::domain::ports::RealtimeNotifier;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::error;

/// Pushes change notifications to the hosted realtime service so other
/// connected sessions refresh. Callers treat this as fire-and-forget.
pub struct HttpBroadcastService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpBroadcastService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl RealtimeNotifier for HttpBroadcastService {
    async fn broadcast(&self, channel: &str, payload: Value) -> Result<(), AppError> {
        let res = self.client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "channel": channel, "payload": payload }))
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Realtime broadcast connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let msg = format!("Realtime broadcast failed. Status: {}", res.status());
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }
        Ok(())
    }
}
