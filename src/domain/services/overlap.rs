use chrono::{DateTime, Utc};

use crate::domain::models::booking_request::BookingRequest;
use crate::domain::models::event::Event;

/// Half-open interval intersection: `[a1, a2)` and `[b1, b2)` overlap iff
/// `a1 < b2 && a2 > b1`. Adjacent intervals do not conflict.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// What an approval collided with, for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictSource {
    Event(String),
    BookingRequest(String),
}

/// Checks a candidate window against confirmed events and other approved
/// booking requests of the same business. The request under approval is
/// excluded so a re-check against its own row cannot self-conflict.
pub fn find_conflict(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    events: &[Event],
    approved_requests: &[BookingRequest],
    exclude_request_id: &str,
) -> Option<ConflictSource> {
    if let Some(event) = events
        .iter()
        .filter(|e| e.deleted_at.is_none())
        .find(|e| intervals_overlap(e.start_date, e.end_date, start, end))
    {
        return Some(ConflictSource::Event(event.id.clone()));
    }

    approved_requests
        .iter()
        .filter(|r| r.id != exclude_request_id)
        .find(|r| intervals_overlap(r.start_date, r.end_date, start, end))
        .map(|r| ConflictSource::BookingRequest(r.id.clone()))
}
