use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// An attachment uploaded with a booking request. Lives in the
/// booking-attachments bucket and is never deleted by the approval
/// workflow.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingRequestFile {
    pub id: String,
    pub booking_request_id: String,
    pub filename: String,
    pub file_path: String,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BookingRequestFile {
    /// Wraps the legacy single-attachment columns of a booking request
    /// row so the migration loop can treat them like any other file.
    pub fn legacy(booking_request_id: &str, filename: &str, file_path: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_request_id: booking_request_id.to_string(),
            filename: filename.to_string(),
            file_path: file_path.to_string(),
            content_type: None,
            size: None,
            created_at: Utc::now(),
        }
    }
}

/// An attachment associated with a calendar event, copied from a booking
/// attachment at approval time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventFile {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub filename: String,
    pub file_path: String,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl EventFile {
    /// Builds the event-side record for a migrated attachment. The path
    /// gets a random suffix so repeated approvals of identically named
    /// files cannot collide in the bucket.
    pub fn migrated_from(source: &BookingRequestFile, event_id: &str, user_id: &str) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            filename: source.filename.clone(),
            file_path: format!("{}/{}-{}", event_id, suffix, source.filename),
            content_type: source.content_type.clone(),
            size: source.size,
            created_at: Utc::now(),
        }
    }
}
