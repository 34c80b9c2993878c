use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::booking_request::{AdditionalPerson, BookingRequest};

pub const DEFAULT_PAYMENT_STATUS: &str = "not_paid";

/// A confirmed calendar entry. Exactly one event is materialized per
/// approved booking request.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_surname: Option<String>,
    pub user_number: Option<String>,
    pub social_network_link: Option<String>,
    pub event_notes: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    pub parent_event_id: Option<String>,
    pub is_recurring: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Maps requester fields onto the event's person fields. Payment
    /// status defaults to `not_paid` when the request carries none.
    pub fn from_booking_request(request: &BookingRequest, owner_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            title: request.title.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            user_surname: Some(request.requester_name.clone()),
            user_number: request.requester_phone.clone(),
            social_network_link: request.requester_email.clone(),
            event_notes: None,
            event_type: "booking_request".to_string(),
            payment_status: Some(
                request
                    .payment_status
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PAYMENT_STATUS.to_string()),
            ),
            payment_amount: request.payment_amount,
            parent_event_id: None,
            is_recurring: false,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }
}

/// An additional person materialized alongside an event.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Customer {
    pub id: String,
    pub event_id: String,
    pub user_surname: String,
    pub user_number: Option<String>,
    pub social_network_link: Option<String>,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub customer_type: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn from_person(event_id: &str, person: &AdditionalPerson) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            user_surname: person.user_surname.clone(),
            user_number: Some(person.user_number.clone()).filter(|s| !s.is_empty()),
            social_network_link: Some(person.social_network_link.clone()).filter(|s| !s.is_empty()),
            payment_status: Some(person.payment_status.clone())
                .filter(|s| !s.trim().is_empty())
                .or_else(|| Some(DEFAULT_PAYMENT_STATUS.to_string())),
            payment_amount: person.payment_amount,
            customer_type: "customer".to_string(),
            created_at: Utc::now(),
        }
    }
}
