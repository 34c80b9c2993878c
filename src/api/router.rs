use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{booking_request, health, subscription};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Booking requests
        .route(
            "/api/v1/{business_id}/booking-requests",
            post(booking_request::create_booking_request).get(booking_request::list_booking_requests),
        )
        .route(
            "/api/v1/{business_id}/booking-requests/{request_id}",
            axum::routing::delete(booking_request::delete_booking_request),
        )
        .route(
            "/api/v1/{business_id}/booking-requests/{request_id}/files",
            get(booking_request::list_booking_request_files),
        )
        .route(
            "/api/v1/{business_id}/booking-requests/{request_id}/approve",
            post(booking_request::approve_booking_request),
        )
        .route(
            "/api/v1/{business_id}/booking-requests/{request_id}/reject",
            post(booking_request::reject_booking_request),
        )

        // Subscription reconciliation (webhook + client verification + manual sync)
        .route(
            "/api/v1/subscriptions/verify",
            post(subscription::verify).options(subscription::preflight),
        )

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        business_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
