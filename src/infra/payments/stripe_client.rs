use crate::domain::models::subscription::{
    ProviderCheckoutSession, ProviderCustomer, ProviderSubscription,
};
use crate::domain::ports::PaymentProvider;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::error;

/// Thin client over the payment provider's REST API. Only the lookups the
/// reconciliation handler needs are implemented; responses are reduced to
/// the provider models through the same parsers used for webhook
/// payloads.
pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment provider connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment provider request failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        res.json().await.map_err(|e| AppError::InternalWithMsg(format!("Payment provider returned malformed JSON: {}", e)))
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Payment provider connection error: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment provider request failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        res.json().await.map_err(|e| AppError::InternalWithMsg(format!("Payment provider returned malformed JSON: {}", e)))
    }

    fn customer_from_value(v: &Value) -> Option<ProviderCustomer> {
        Some(ProviderCustomer {
            id: v.get("id")?.as_str()?.to_string(),
            email: v.get("email").and_then(Value::as_str).map(str::to_string),
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn get_customer(&self, customer_id: &str) -> Result<ProviderCustomer, AppError> {
        let body = self.get(&format!("/customers/{}", customer_id), &[]).await?;
        Self::customer_from_value(&body)
            .ok_or_else(|| AppError::InternalWithMsg("Malformed customer object".into()))
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<ProviderCustomer>, AppError> {
        let body = self.get("/customers", &[("email", email), ("limit", "1")]).await?;
        let found = body
            .pointer("/data/0")
            .and_then(Self::customer_from_value);
        Ok(found)
    }

    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, AppError> {
        let body = self.post_form("/customers", &[("email", email)]).await?;
        Self::customer_from_value(&body)
            .ok_or_else(|| AppError::InternalWithMsg("Malformed customer object".into()))
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<ProviderSubscription, AppError> {
        let body = self.get(&format!("/subscriptions/{}", subscription_id), &[]).await?;
        ProviderSubscription::from_value(&body)
            .ok_or_else(|| AppError::InternalWithMsg("Malformed subscription object".into()))
    }

    async fn list_active_subscriptions(&self, customer_id: &str) -> Result<Vec<ProviderSubscription>, AppError> {
        let body = self.get(
            "/subscriptions",
            &[("customer", customer_id), ("status", "active"), ("limit", "3")],
        ).await?;

        let subscriptions = body
            .pointer("/data")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ProviderSubscription::from_value).collect())
            .unwrap_or_default();
        Ok(subscriptions)
    }

    async fn get_checkout_session(&self, session_id: &str) -> Result<ProviderCheckoutSession, AppError> {
        let body = self.get(&format!("/checkout/sessions/{}", session_id), &[]).await?;
        ProviderCheckoutSession::from_value(&body)
            .ok_or_else(|| AppError::InternalWithMsg("Malformed checkout session object".into()))
    }

    async fn list_recent_checkout_sessions(&self, customer_id: &str) -> Result<Vec<ProviderCheckoutSession>, AppError> {
        let body = self.get(
            "/checkout/sessions",
            &[("customer", customer_id), ("limit", "5")],
        ).await?;

        let sessions = body
            .pointer("/data")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ProviderCheckoutSession::from_value).collect())
            .unwrap_or_default();
        Ok(sessions)
    }
}
