use serde_json::Value;
use tracing::warn;

use crate::domain::models::booking_request::{AdditionalPerson, BookingRequest};

/// Parses the `additional_persons` column. Older clients stored the list
/// double-encoded (a JSON string containing JSON), so both shapes are
/// accepted. Malformed input fails closed to an empty list rather than
/// aborting the approval.
pub fn parse_additional_persons(raw: Option<&str>) -> Vec<AdditionalPerson> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            warn!("additional_persons is not valid JSON, treating as empty: {}", e);
            return Vec::new();
        }
    };

    let list_value = match value {
        Value::Array(_) => value,
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(v @ Value::Array(_)) => v,
            _ => {
                warn!("additional_persons string payload is not a JSON array, treating as empty");
                return Vec::new();
            }
        },
        _ => {
            warn!("additional_persons has unexpected JSON shape, treating as empty");
            return Vec::new();
        }
    };

    match serde_json::from_value::<Vec<AdditionalPerson>>(list_value) {
        Ok(list) => list,
        Err(e) => {
            warn!("additional_persons entries failed to decode, treating as empty: {}", e);
            Vec::new()
        }
    }
}

/// Older booking forms stored a single extra person directly on the
/// request row. Folds it in when it names someone other than the
/// requester and is not already present in the parsed list.
pub fn legacy_extra_person(request: &BookingRequest) -> Option<AdditionalPerson> {
    let surname = request.user_surname.as_deref().unwrap_or("").trim();
    let link = request.social_network_link.as_deref().unwrap_or("").trim();

    if surname.is_empty() && link.is_empty() {
        return None;
    }

    let requester_email = request.requester_email.as_deref().unwrap_or("").trim();
    if surname == request.requester_name.trim() && link == requester_email {
        return None;
    }

    Some(AdditionalPerson {
        user_surname: surname.to_string(),
        user_number: String::new(),
        social_network_link: link.to_string(),
        event_notes: String::new(),
        payment_status: String::new(),
        payment_amount: None,
    })
}

/// Full normalized attendee list for an approval: parsed entries plus the
/// folded legacy person, restricted to email-bearing entries.
pub fn normalize_attendees(request: &BookingRequest) -> Vec<AdditionalPerson> {
    let mut persons = parse_additional_persons(request.additional_persons.as_deref());

    if let Some(extra) = legacy_extra_person(request) {
        let duplicate = persons.iter().any(|p| {
            p.user_surname.trim() == extra.user_surname
                && p.social_network_link.trim() == extra.social_network_link
        });
        if !duplicate {
            persons.push(extra);
        }
    }

    persons.retain(AdditionalPerson::has_email);
    persons
}

/// One confirmation email target with its own person context.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub full_name: String,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    pub event_notes: Option<String>,
}

/// Primary requester first (when they left an email), then every valid
/// additional person with their own payment/notes context.
pub fn collect_recipients(
    request: &BookingRequest,
    attendees: &[AdditionalPerson],
) -> Vec<Recipient> {
    let mut recipients = Vec::new();

    if let Some(email) = request
        .requester_email
        .as_deref()
        .map(str::trim)
        .filter(|e| e.contains('@'))
    {
        recipients.push(Recipient {
            email: email.to_string(),
            full_name: request.requester_name.clone(),
            payment_status: request.payment_status.clone(),
            payment_amount: request.payment_amount,
            event_notes: None,
        });
    }

    for person in attendees {
        recipients.push(Recipient {
            email: person.social_network_link.trim().to_string(),
            full_name: person.user_surname.clone(),
            payment_status: Some(person.payment_status.clone()).filter(|s| !s.is_empty()),
            payment_amount: person.payment_amount,
            event_notes: Some(person.event_notes.clone()).filter(|s| !s.is_empty()),
        });
    }

    recipients
}
