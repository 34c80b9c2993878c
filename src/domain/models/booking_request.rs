use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// A prospective booking submitted through the public form. Only the
/// approval workflow mutates `status`; `approved` and `rejected` are
/// terminal.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingRequest {
    pub id: String,
    pub business_id: String,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    /// JSON-encoded list of additional persons, possibly double-encoded
    /// by older clients. Parsed fail-closed at approval time.
    pub additional_persons: Option<String>,
    // Legacy single-extra-person encoding kept by older booking forms.
    pub user_surname: Option<String>,
    pub social_network_link: Option<String>,
    // Legacy single-attachment encoding.
    pub filename: Option<String>,
    pub file_path: Option<String>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingRequestParams {
    pub business_id: String,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    pub additional_persons: Option<String>,
    pub language: Option<String>,
}

impl BookingRequest {
    pub fn new(params: NewBookingRequestParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            business_id: params.business_id,
            requester_name: params.requester_name,
            requester_email: params.requester_email,
            requester_phone: params.requester_phone,
            title: params.title,
            start_date: params.start_date,
            end_date: params.end_date,
            status: STATUS_PENDING.to_string(),
            payment_status: params.payment_status,
            payment_amount: params.payment_amount,
            additional_persons: params.additional_persons,
            user_surname: None,
            social_network_link: None,
            filename: None,
            file_path: None,
            language: params.language,
            created_at: Utc::now(),
        }
    }
}

/// A secondary attendee attached to a booking request. The wire encoding
/// is camelCase because the public form submits it that way.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalPerson {
    pub user_surname: String,
    pub user_number: String,
    pub social_network_link: String,
    pub event_notes: String,
    pub payment_status: String,
    pub payment_amount: Option<f64>,
}

impl AdditionalPerson {
    /// Only entries whose contact field carries an email address are
    /// materialized as customers and receive confirmation mail.
    pub fn has_email(&self) -> bool {
        self.social_network_link.contains('@')
    }
}
