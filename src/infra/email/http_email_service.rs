use crate::domain::models::email::BookingConfirmation;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Client for the external email dispatch function. The bearer credential
/// can expire mid-flight; on a 401 exactly one session refresh round-trip
/// is attempted before the send is declared failed.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    token: RwLock<String>,
    refresh_url: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, token: String, refresh_url: String, refresh_token: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token: RwLock::new(token),
            refresh_url,
            refresh_token,
        }
    }

    async fn post(&self, payload: &BookingConfirmation, token: &str) -> Result<Response, AppError> {
        self.client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", token))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Email service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })
    }

    async fn refresh_session(&self) -> Result<String, AppError> {
        let res = self.client
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh_token": self.refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Session refresh failed: {}", e)))?;

        if !res.status().is_success() {
            return Err(AppError::Unauthorized);
        }

        let body: RefreshResponse = res
            .json()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Session refresh returned malformed body: {}", e)))?;

        let mut token = self.token.write().await;
        *token = body.access_token.clone();
        Ok(body.access_token)
    }

    fn non_success(status: StatusCode, body: String) -> AppError {
        let msg = format!("Email service failed. Status: {}, Body: {}", status, body);
        error!("{}", msg);
        AppError::InternalWithMsg(msg)
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send_confirmation(&self, payload: &BookingConfirmation) -> Result<(), AppError> {
        let token = self.token.read().await.clone();
        let res = self.post(payload, &token).await?;

        if res.status() == StatusCode::UNAUTHORIZED {
            info!("Email dispatch got 401, refreshing session once");
            let fresh = self.refresh_session().await?;
            let retry = self.post(payload, &fresh).await?;
            if !retry.status().is_success() {
                let status = retry.status();
                let text = retry.text().await.unwrap_or_default();
                return Err(Self::non_success(status, text));
            }
            return Ok(());
        }

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Self::non_success(status, text));
        }

        Ok(())
    }
}
