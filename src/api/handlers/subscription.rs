use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::VerifyRequest;
use crate::domain::models::subscription::{
    ProviderCheckoutSession, ProviderSubscription, Subscription, SUB_STATUS_ACTIVE,
    SUB_STATUS_TRIAL_EXPIRED,
};
use crate::domain::services::billing::{compute_period, PlanType};
use crate::error::AppError;
use crate::state::AppState;

fn with_cors(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    response
}

fn cors_json(status: StatusCode, body: Value) -> Response {
    with_cors((status, Json(body)).into_response())
}

pub async fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert("Access-Control-Allow-Methods", HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("authorization, content-type, stripe-signature"),
    );
    response
}

/// Single endpoint, three request shapes: provider webhook, client-side
/// checkout verification, manual resync. The shape is decoded once; the
/// rest is an exhaustive match. The body is parsed here rather than by an
/// extractor so even a malformed payload gets a CORS-bearing rejection.
pub async fn verify(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Ok(body) = serde_json::from_slice::<Value>(&body) else {
        return cors_json(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Request body is not valid JSON" }),
        );
    };

    let result = match VerifyRequest::decode(&body) {
        None => {
            return cors_json(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Unrecognized request shape" }),
            )
        }
        Some(VerifyRequest::Webhook { event_type, data }) => {
            handle_webhook(&state, &event_type, &data).await
        }
        Some(VerifyRequest::CheckoutSession { session_id }) => {
            verify_checkout_session(&state, &session_id).await
        }
        Some(VerifyRequest::ManualSync { user_id }) => manual_sync(&state, &user_id).await,
    };

    match result {
        Ok(response) => response,
        Err(e) => with_cors(e.into_response()),
    }
}

/// Recognized-but-unprocessable payloads are acknowledged with 200 so the
/// provider does not retry an unrecoverable delivery forever.
async fn handle_webhook(
    state: &Arc<AppState>,
    event_type: &str,
    data: &Value,
) -> Result<Response, AppError> {
    match event_type {
        "checkout.session.completed" => {
            let Some(session) = data.get("object").and_then(ProviderCheckoutSession::from_value)
            else {
                warn!("checkout.session.completed carried a malformed session object");
                return Ok(cors_json(StatusCode::OK, json!({ "received": true, "handled": false })));
            };
            let handled = apply_checkout_session(state, &session).await?.is_some();
            Ok(cors_json(StatusCode::OK, json!({ "received": true, "handled": handled })))
        }
        "customer.subscription.created" | "customer.subscription.updated" => {
            let Some(subscription) = data.get("object").and_then(ProviderSubscription::from_value)
            else {
                warn!("{} carried a malformed subscription object", event_type);
                return Ok(cors_json(StatusCode::OK, json!({ "received": true, "handled": false })));
            };
            let handled = apply_provider_subscription(state, &subscription, None, None)
                .await?
                .is_some();
            Ok(cors_json(StatusCode::OK, json!({ "received": true, "handled": handled })))
        }
        other => {
            info!("Ignoring webhook event type {}", other);
            Ok(cors_json(StatusCode::OK, json!({ "received": true, "handled": false })))
        }
    }
}

/// Client-initiated verification of a checkout session it just finished.
async fn verify_checkout_session(
    state: &Arc<AppState>,
    session_id: &str,
) -> Result<Response, AppError> {
    let session = state.payment_provider.get_checkout_session(session_id).await?;

    if !session.is_paid() {
        return Ok(cors_json(
            StatusCode::OK,
            json!({ "success": false, "payment_status": session.payment_status }),
        ));
    }

    match apply_checkout_session(state, &session).await? {
        Some(subscription) => Ok(cors_json(
            StatusCode::OK,
            json!({ "success": true, "status": subscription.status, "plan_type": subscription.plan_type }),
        )),
        None => Ok(cors_json(
            StatusCode::OK,
            json!({ "success": false, "error": "Could not resolve a user for this session" }),
        )),
    }
}

/// Resync a user's subscription directly against the provider.
async fn manual_sync(state: &Arc<AppState>, user_id: &str) -> Result<Response, AppError> {
    let user = state.user_repo.find_by_id(user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let existing = state.subscription_repo.find_by_email(&user.email).await?;

    let customer_id = match existing.as_ref().and_then(|s| s.stripe_customer_id.clone()) {
        Some(id) => id,
        None => match state.payment_provider.find_customer_by_email(&user.email).await? {
            Some(customer) => customer.id,
            None => state.payment_provider.create_customer(&user.email).await?.id,
        },
    };

    let active = state.payment_provider.list_active_subscriptions(&customer_id).await?;
    if let Some(subscription) = active.first() {
        let record = apply_provider_subscription(
            state,
            subscription,
            Some(user.id.clone()),
            Some(user.email.clone()),
        )
        .await?;
        let record = record.ok_or(AppError::Internal)?;
        return Ok(cors_json(
            StatusCode::OK,
            json!({ "status": record.status, "plan_type": record.plan_type }),
        ));
    }

    // No live subscription; a paid checkout session whose completion
    // webhook never landed gets replayed here.
    let sessions = state.payment_provider.list_recent_checkout_sessions(&customer_id).await?;
    let already_processed = existing.as_ref().and_then(|s| s.stripe_subscription_id.clone());
    let unprocessed = sessions.iter().find(|s| {
        s.is_paid()
            && s.subscription_id.is_some()
            && s.subscription_id != already_processed
    });

    if let Some(session) = unprocessed {
        info!("Manual sync replaying paid checkout session {} for user {}", session.id, user_id);
        if let Some(record) = apply_checkout_session(state, session).await? {
            return Ok(cors_json(
                StatusCode::OK,
                json!({ "status": record.status, "plan_type": record.plan_type }),
            ));
        }
    }

    let record = state.subscription_repo.upsert_by_email(&Subscription {
        user_id: Some(user.id),
        email: user.email,
        status: SUB_STATUS_TRIAL_EXPIRED.to_string(),
        stripe_customer_id: Some(customer_id),
        stripe_subscription_id: None,
        plan_type: None,
        current_period_start: None,
        current_period_end: None,
        updated_at: Utc::now(),
    }).await?;

    Ok(cors_json(StatusCode::OK, json!({ "status": record.status })))
}

/// Normalizes a completed checkout into the canonical subscription row.
/// Returns None when no user can be resolved, which callers acknowledge
/// rather than error on.
async fn apply_checkout_session(
    state: &Arc<AppState>,
    session: &ProviderCheckoutSession,
) -> Result<Option<Subscription>, AppError> {
    // Resolution order: session metadata, then known-user email, then an
    // earlier subscription row carrying the provider's customer id.
    let mut user = match session.metadata_user_id.as_deref() {
        Some(id) => state.user_repo.find_by_id(id).await?,
        None => None,
    };
    if user.is_none() {
        if let Some(email) = session.customer_email.as_deref() {
            user = state.user_repo.find_by_email(email).await?;
        }
    }
    let prior = match (&user, session.customer_id.as_deref()) {
        (None, Some(customer_id)) => state.subscription_repo.find_by_customer_id(customer_id).await?,
        _ => None,
    };

    let email = user.as_ref().map(|u| u.email.clone())
        .or_else(|| session.customer_email.clone())
        .or_else(|| prior.as_ref().map(|s| s.email.clone()));

    let Some(email) = email else {
        warn!("Could not resolve a user for checkout session {}", session.id);
        return Ok(None);
    };

    let user_id = user.map(|u| u.id)
        .or_else(|| session.metadata_user_id.clone())
        .or_else(|| prior.as_ref().and_then(|s| s.user_id.clone()));

    let provider_subscription = match session.subscription_id.as_deref() {
        Some(id) => Some(state.payment_provider.get_subscription(id).await?),
        None => None,
    };

    let interval = provider_subscription.as_ref().and_then(|s| s.interval.clone());
    let plan = PlanType::from_interval(interval.as_deref());
    let provider_end = provider_subscription.as_ref().and_then(|s| s.current_period_end);
    let (start, end) = compute_period(plan, provider_end, Utc::now());

    let record = state.subscription_repo.upsert_by_email(&Subscription {
        user_id,
        email,
        status: SUB_STATUS_ACTIVE.to_string(),
        stripe_customer_id: session.customer_id.clone(),
        stripe_subscription_id: session.subscription_id.clone(),
        plan_type: plan.map(|p| p.as_str().to_string()),
        current_period_start: Some(start),
        current_period_end: end,
        updated_at: Utc::now(),
    }).await?;

    Ok(Some(record))
}

/// Normalizes a provider subscription object (webhook or API) into the
/// canonical row. `user_id`/`email` hints short-circuit resolution when
/// the caller already knows the user.
async fn apply_provider_subscription(
    state: &Arc<AppState>,
    subscription: &ProviderSubscription,
    user_id_hint: Option<String>,
    email_hint: Option<String>,
) -> Result<Option<Subscription>, AppError> {
    let (user_id, email) = match email_hint {
        Some(email) => (user_id_hint, email),
        None => {
            let prior = match subscription.customer_id.as_deref() {
                Some(customer_id) => state.subscription_repo.find_by_customer_id(customer_id).await?,
                None => None,
            };
            if let Some(prior) = prior {
                (prior.user_id, prior.email)
            } else if let Some(customer_id) = subscription.customer_id.as_deref() {
                let customer = state.payment_provider.get_customer(customer_id).await?;
                let Some(email) = customer.email else {
                    warn!("Provider customer {} has no email; skipping subscription {}", customer_id, subscription.id);
                    return Ok(None);
                };
                let user = state.user_repo.find_by_email(&email).await?;
                (user.map(|u| u.id), email)
            } else {
                warn!("Subscription {} carries no customer; skipping", subscription.id);
                return Ok(None);
            }
        }
    };

    let plan = PlanType::from_interval(subscription.interval.as_deref());
    let (start, end) = compute_period(plan, subscription.current_period_end, Utc::now());

    let record = state.subscription_repo.upsert_by_email(&Subscription {
        user_id,
        email,
        status: subscription.canonical_status().to_string(),
        stripe_customer_id: subscription.customer_id.clone(),
        stripe_subscription_id: Some(subscription.id.clone()),
        plan_type: plan.map(|p| p.as_str().to_string()),
        current_period_start: Some(start),
        current_period_end: end,
        updated_at: Utc::now(),
    }).await?;

    Ok(Some(record))
}
