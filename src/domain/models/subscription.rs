use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

pub const SUB_STATUS_ACTIVE: &str = "active";
pub const SUB_STATUS_INACTIVE: &str = "inactive";
pub const SUB_STATUS_TRIAL_EXPIRED: &str = "trial_expired";

/// Canonical subscription record. Upserts are keyed on `email` because
/// some webhook resolution paths only know an email at write time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Subscription {
    pub user_id: Option<String>,
    pub email: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub plan_type: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProviderCustomer {
    pub id: String,
    pub email: Option<String>,
}

/// The payment provider's view of a subscription, reduced to the fields
/// reconciliation needs. Built from raw webhook objects and from API
/// responses through the same parser.
#[derive(Debug, Clone)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer_id: Option<String>,
    pub status: String,
    pub interval: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl ProviderSubscription {
    pub fn from_value(v: &Value) -> Option<Self> {
        let id = v.get("id")?.as_str()?.to_string();

        let customer_id = v.get("customer").and_then(|c| {
            c.as_str()
                .map(str::to_string)
                .or_else(|| c.get("id").and_then(Value::as_str).map(str::to_string))
        });

        let status = v
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("active")
            .to_string();

        // Current API shape first, legacy `plan` object as fallback.
        let interval = v
            .pointer("/items/data/0/price/recurring/interval")
            .or_else(|| v.pointer("/plan/interval"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let current_period_end = v
            .get("current_period_end")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Some(Self {
            id,
            customer_id,
            status,
            interval,
            current_period_end,
        })
    }

    /// Provider statuses collapse onto the two non-trial states we track.
    pub fn canonical_status(&self) -> &'static str {
        match self.status.as_str() {
            "active" | "trialing" => SUB_STATUS_ACTIVE,
            _ => SUB_STATUS_INACTIVE,
        }
    }
}

/// A checkout session as delivered by webhook or fetched for client-side
/// verification.
#[derive(Debug, Clone)]
pub struct ProviderCheckoutSession {
    pub id: String,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub payment_status: Option<String>,
    pub metadata_user_id: Option<String>,
    pub subscription_id: Option<String>,
}

impl ProviderCheckoutSession {
    pub fn from_value(v: &Value) -> Option<Self> {
        let id = v.get("id")?.as_str()?.to_string();

        let customer_id = v.get("customer").and_then(|c| {
            c.as_str()
                .map(str::to_string)
                .or_else(|| c.get("id").and_then(Value::as_str).map(str::to_string))
        });

        let customer_email = v
            .get("customer_email")
            .and_then(Value::as_str)
            .or_else(|| v.pointer("/customer_details/email").and_then(Value::as_str))
            .map(str::to_string);

        let payment_status = v
            .get("payment_status")
            .and_then(Value::as_str)
            .map(str::to_string);

        let metadata_user_id = v
            .pointer("/metadata/user_id")
            .or_else(|| v.pointer("/metadata/userId"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let subscription_id = v.get("subscription").and_then(|s| {
            s.as_str()
                .map(str::to_string)
                .or_else(|| s.get("id").and_then(Value::as_str).map(str::to_string))
        });

        Some(Self {
            id,
            customer_id,
            customer_email,
            payment_status,
            metadata_user_id,
            subscription_id,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}
