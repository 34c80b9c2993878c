use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    /// Either a JSON array of persons or a pre-serialized JSON string;
    /// stored verbatim and parsed fail-closed at approval time.
    pub additional_persons: Option<Value>,
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct ListBookingRequestsParams {
    pub status: Option<String>,
}

/// The three request shapes accepted by the subscription verification
/// endpoint, decoded once at the boundary. Presence of `type` + `data`
/// wins over `session_id`, which wins over `user_id`.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyRequest {
    Webhook { event_type: String, data: Value },
    CheckoutSession { session_id: String },
    ManualSync { user_id: String },
}

impl VerifyRequest {
    pub fn decode(body: &Value) -> Option<Self> {
        let obj = body.as_object()?;

        if let (Some(event_type), Some(data)) = (
            obj.get("type").and_then(Value::as_str),
            obj.get("data"),
        ) {
            return Some(Self::Webhook {
                event_type: event_type.to_string(),
                data: data.clone(),
            });
        }

        if let Some(session_id) = obj.get("session_id").and_then(Value::as_str) {
            return Some(Self::CheckoutSession {
                session_id: session_id.to_string(),
            });
        }

        if let Some(user_id) = obj.get("user_id").and_then(Value::as_str) {
            return Some(Self::ManualSync {
                user_id: user_id.to_string(),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_webhook_shape() {
        let body = json!({ "type": "checkout.session.completed", "data": { "object": {} } });
        match VerifyRequest::decode(&body) {
            Some(VerifyRequest::Webhook { event_type, .. }) => {
                assert_eq!(event_type, "checkout.session.completed");
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn decodes_session_and_manual_shapes() {
        assert_eq!(
            VerifyRequest::decode(&json!({ "session_id": "cs_1" })),
            Some(VerifyRequest::CheckoutSession { session_id: "cs_1".into() })
        );
        assert_eq!(
            VerifyRequest::decode(&json!({ "user_id": "u-1" })),
            Some(VerifyRequest::ManualSync { user_id: "u-1".into() })
        );
    }

    #[test]
    fn webhook_shape_takes_precedence() {
        let body = json!({ "type": "x", "data": {}, "session_id": "cs_1", "user_id": "u-1" });
        assert!(matches!(
            VerifyRequest::decode(&body),
            Some(VerifyRequest::Webhook { .. })
        ));
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        assert_eq!(VerifyRequest::decode(&json!({})), None);
        assert_eq!(VerifyRequest::decode(&json!({ "type": "x" })), None);
        assert_eq!(VerifyRequest::decode(&json!([1, 2])), None);
        assert_eq!(VerifyRequest::decode(&json!({ "user_id": 42 })), None);
    }
}
