mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use bookwise_backend::domain::models::booking_request::{BookingRequest, NewBookingRequestParams};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::Value;
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn pending_with_guests() -> BookingRequest {
    let base = Utc::now() + Duration::days(7);
    let mut request = BookingRequest::new(NewBookingRequestParams {
        business_id: "b1".to_string(),
        requester_name: "Maria Kovac".to_string(),
        requester_email: Some("maria@example.com".to_string()),
        requester_phone: None,
        title: "Consultation".to_string(),
        start_date: base,
        end_date: base + Duration::hours(2),
        payment_status: Some("paid".to_string()),
        payment_amount: Some(80.0),
        additional_persons: None,
        language: Some("de".to_string()),
    });
    request.additional_persons = Some(
        r#"[{"userSurname":"Guest One","socialNetworkLink":"guest1@example.com","eventNotes":"window seat"},
            {"userSurname":"Guest Two","socialNetworkLink":"guest2@example.com"}]"#.to_string(),
    );
    request
}

async fn seed_owner(app: &TestApp) {
    app.seed_user("u1", "owner@biz.test", "b1").await;
    app.seed_business("b1", "u1", "Studio One", Some("Main St 1")).await;
}

async fn approve(app: &TestApp, request_id: &str) -> axum::response::Response {
    let auth = app.auth("u1", "b1");
    app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/b1/booking-requests/{}/approve", request_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_every_recipient_gets_their_own_context() {
    let app = TestApp::new().await;
    seed_owner(&app).await;
    let request = app.seed_booking_request(&pending_with_guests()).await;

    let res = approve(&app, &request.id).await;
    assert_eq!(res.status(), StatusCode::OK);

    let attempts = app.email.attempts.lock().unwrap();
    assert_eq!(attempts.len(), 3);

    // Requester first, carrying the request's own payment context.
    assert_eq!(attempts[0].recipient_email, "maria@example.com");
    assert_eq!(attempts[0].payment_status, "paid");
    assert_eq!(attempts[0].payment_amount, Some(80.0));
    assert_eq!(attempts[0].business_name, "Studio One");
    assert_eq!(attempts[0].business_address.as_deref(), Some("Main St 1"));
    assert_eq!(attempts[0].language.as_deref(), Some("de"));

    let guest1 = attempts.iter().find(|a| a.recipient_email == "guest1@example.com").unwrap();
    assert_eq!(guest1.full_name, "Guest One");
    assert_eq!(guest1.event_notes.as_deref(), Some("window seat"));
    // Persons without a payment status fall back to the default.
    assert_eq!(guest1.payment_status, "not_paid");
}

#[tokio::test]
async fn test_partial_failure_is_reported_not_fatal() {
    let app = TestApp::new().await;
    seed_owner(&app).await;
    let request = app.seed_booking_request(&pending_with_guests()).await;

    app.email.fail_for("guest1@example.com");

    let res = approve(&app, &request.id).await;
    assert_eq!(res.status(), StatusCode::OK);

    let report = parse_body(res).await;
    assert_eq!(report["emails_sent"], 2);
    assert_eq!(report["emails_failed"], 1);
    let warnings: Vec<String> = report["warnings"].as_array().unwrap()
        .iter().map(|w| w.as_str().unwrap().to_string()).collect();
    assert!(warnings.iter().any(|w| w == "1 of 3 confirmation emails failed"));

    // All three were attempted; no recipient was skipped after a failure.
    assert_eq!(app.email.attempts.lock().unwrap().len(), 3);

    let stored = app.state.booking_request_repo.find_by_id("b1", &request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "approved");
}

#[tokio::test]
async fn test_total_email_failure_keeps_the_approval() {
    let app = TestApp::new().await;
    seed_owner(&app).await;
    let request = app.seed_booking_request(&pending_with_guests()).await;

    app.email.fail_for("maria@example.com");
    app.email.fail_for("guest1@example.com");
    app.email.fail_for("guest2@example.com");

    let res = approve(&app, &request.id).await;
    assert_eq!(res.status(), StatusCode::OK);

    let report = parse_body(res).await;
    assert_eq!(report["emails_sent"], 0);
    assert_eq!(report["emails_failed"], 3);
    let warnings: Vec<String> = report["warnings"].as_array().unwrap()
        .iter().map(|w| w.as_str().unwrap().to_string()).collect();
    assert!(warnings.iter().any(|w| w == "all confirmation emails failed"));
    assert_eq!(report["event_created"], true);
}

#[tokio::test]
async fn test_no_recipients_is_a_warning_not_an_error() {
    let app = TestApp::new().await;
    seed_owner(&app).await;

    let mut request = pending_with_guests();
    request.requester_email = Some("just-a-phone".to_string());
    request.additional_persons = None;
    let request = app.seed_booking_request(&request).await;

    let res = approve(&app, &request.id).await;
    assert_eq!(res.status(), StatusCode::OK);

    let report = parse_body(res).await;
    assert_eq!(report["emails_sent"], 0);
    let warnings: Vec<String> = report["warnings"].as_array().unwrap()
        .iter().map(|w| w.as_str().unwrap().to_string()).collect();
    assert!(warnings.iter().any(|w| w == "no email recipients"));
    assert!(app.email.sent_to().is_empty());
}
