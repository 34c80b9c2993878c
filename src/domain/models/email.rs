use serde::Serialize;
use chrono::{DateTime, Utc};

/// Request body for the external email dispatch function. Field names are
/// camelCase because that is the function's contract.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub recipient_email: String,
    pub full_name: String,
    pub business_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub payment_status: String,
    pub payment_amount: Option<f64>,
    pub business_address: Option<String>,
    pub language: Option<String>,
    pub event_notes: Option<String>,
    pub event_id: String,
    pub source: String,
}
