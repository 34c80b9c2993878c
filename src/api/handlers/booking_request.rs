use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::dtos::requests::{CreateBookingRequest, ListBookingRequestsParams};
use crate::api::dtos::responses::{ApprovalReport, BookingRequestFileLink};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking_request::{
    BookingRequest, NewBookingRequestParams, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED,
};
use crate::domain::models::email::BookingConfirmation;
use crate::domain::models::event::Event;
use crate::domain::models::file::{BookingRequestFile, EventFile};
use crate::domain::services::overlap::find_conflict;
use crate::domain::services::persons::{collect_recipients, normalize_attendees};
use crate::error::AppError;
use crate::state::AppState;

const SIGNED_URL_TTL_SECS: u32 = 3600;

pub async fn create_booking_request(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.end_date <= payload.start_date {
        return Err(AppError::Validation("end_date must be after start_date".into()));
    }
    if payload.requester_name.trim().is_empty() {
        return Err(AppError::Validation("requester_name must not be empty".into()));
    }

    // Stored verbatim; the approval workflow parses it fail-closed.
    let additional_persons = payload.additional_persons.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    let request = BookingRequest::new(NewBookingRequestParams {
        business_id,
        requester_name: payload.requester_name,
        requester_email: payload.requester_email,
        requester_phone: payload.requester_phone,
        title: payload.title,
        start_date: payload.start_date,
        end_date: payload.end_date,
        payment_status: payload.payment_status,
        payment_amount: payload.payment_amount,
        additional_persons,
        language: payload.language,
    });

    let created = state.booking_request_repo.create(&request).await?;
    info!("Booking request submitted: {} for business {}", created.id, created.business_id);
    Ok(Json(created))
}

pub async fn list_booking_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(auth): AuthUser,
    Path(business_id): Path<String>,
    Query(params): Query<ListBookingRequestsParams>,
) -> Result<impl IntoResponse, AppError> {
    require_business(&auth.business_id, &business_id)?;

    let requests = state
        .booking_request_repo
        .list_by_business(&business_id, params.status.as_deref())
        .await?;
    Ok(Json(requests))
}

pub async fn list_booking_request_files(
    State(state): State<Arc<AppState>>,
    AuthUser(auth): AuthUser,
    Path((business_id, request_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_business(&auth.business_id, &business_id)?;

    let request = state.booking_request_repo.find_by_id(&business_id, &request_id).await?
        .ok_or(AppError::NotFound("Booking request not found".into()))?;

    let files = attachments_of(&state, &request).await?;
    let bucket = &state.config.booking_attachments_bucket;

    let mut links = Vec::with_capacity(files.len());
    for file in files {
        let url = state.storage
            .create_signed_url(bucket, &file.file_path, SIGNED_URL_TTL_SECS)
            .await?;
        links.push(BookingRequestFileLink {
            id: file.id,
            filename: file.filename,
            url,
        });
    }
    Ok(Json(links))
}

/// Approval workflow. Phase 1 (conflict check + status commit) is
/// authoritative and aborts cleanly; phase 2 (event materialization,
/// attachment migration, email fan-out) is best-effort and its failures
/// land in the report, never roll back the status.
pub async fn approve_booking_request(
    State(state): State<Arc<AppState>>,
    AuthUser(auth): AuthUser,
    Path((business_id, request_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_business(&auth.business_id, &business_id)?;

    let request = state.booking_request_repo.find_by_id(&business_id, &request_id).await?
        .ok_or(AppError::NotFound("Booking request not found".into()))?;

    if request.status != STATUS_PENDING {
        return Err(AppError::Conflict(format!(
            "Booking request is already {}",
            request.status
        )));
    }

    let events = state.event_repo
        .list_active_in_range(&auth.user_id, request.start_date, request.end_date)
        .await?;
    let approved = state.booking_request_repo
        .list_approved_in_range(&business_id, request.start_date, request.end_date)
        .await?;

    if let Some(conflict) = find_conflict(request.start_date, request.end_date, &events, &approved, &request.id) {
        warn!("Approval rejected for {}: conflicts with {:?}", request.id, conflict);
        return Err(AppError::Conflict("Time slot is no longer available".into()));
    }

    // Compare-and-set: a competing approval that won the race shows up
    // here as 0 rows updated.
    let committed = state.booking_request_repo
        .transition_status(&business_id, &request.id, STATUS_PENDING, STATUS_APPROVED)
        .await?;
    if !committed {
        return Err(AppError::Conflict("Booking request was modified concurrently".into()));
    }

    info!("Booking request approved: {}", request.id);
    let mut report = ApprovalReport::approved(request.id.clone());

    let attendees = normalize_attendees(&request);

    let event = Event::from_booking_request(&request, &auth.user_id);
    let saved_event = match state.event_repo.save_event_with_persons(&event, &attendees).await {
        Ok(saved) => saved,
        Err(e) => {
            error!("Event creation failed for approved request {}: {}", request.id, e);
            report.warnings.push("Event creation failed; the request stays approved".to_string());
            notify_change(&state, &business_id, &request.id, STATUS_APPROVED).await;
            return Ok(Json(report));
        }
    };
    report.event_id = Some(saved_event.id.clone());
    report.event_created = true;

    migrate_attachments(&state, &request, &saved_event, &auth.user_id, &mut report).await;
    send_confirmations(&state, &request, &saved_event, &business_id, &attendees, &mut report).await;

    notify_change(&state, &business_id, &request.id, STATUS_APPROVED).await;
    Ok(Json(report))
}

pub async fn reject_booking_request(
    State(state): State<Arc<AppState>>,
    AuthUser(auth): AuthUser,
    Path((business_id, request_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_business(&auth.business_id, &business_id)?;

    let request = state.booking_request_repo.find_by_id(&business_id, &request_id).await?
        .ok_or(AppError::NotFound("Booking request not found".into()))?;

    if request.status != STATUS_PENDING {
        return Err(AppError::Conflict(format!(
            "Booking request is already {}",
            request.status
        )));
    }

    let committed = state.booking_request_repo
        .transition_status(&business_id, &request_id, STATUS_PENDING, STATUS_REJECTED)
        .await?;
    if !committed {
        return Err(AppError::Conflict("Booking request was modified concurrently".into()));
    }

    info!("Booking request rejected: {}", request_id);
    notify_change(&state, &business_id, &request_id, STATUS_REJECTED).await;
    Ok(Json(serde_json::json!({ "status": STATUS_REJECTED })))
}

pub async fn delete_booking_request(
    State(state): State<Arc<AppState>>,
    AuthUser(auth): AuthUser,
    Path((business_id, request_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_business(&auth.business_id, &business_id)?;

    let request = state.booking_request_repo.find_by_id(&business_id, &request_id).await?
        .ok_or(AppError::NotFound("Booking request not found".into()))?;

    // Blobs go first; their rows and the request row follow. A storage
    // failure is logged but does not block the delete.
    let files = match attachments_of(&state, &request).await {
        Ok(files) => files,
        Err(e) => {
            warn!("Failed to list attachments of {} before delete: {}", request_id, e);
            Vec::new()
        }
    };
    if !files.is_empty() {
        let paths: Vec<String> = files.iter().map(|f| f.file_path.clone()).collect();
        if let Err(e) = state.storage.remove(&state.config.booking_attachments_bucket, &paths).await {
            warn!("Failed to remove attachments of {}: {}", request_id, e);
        }
        state.file_repo.delete_by_booking_request(&request_id).await?;
    }

    state.booking_request_repo.delete(&business_id, &request_id).await?;

    info!("Booking request deleted: {}", request_id);
    notify_change(&state, &business_id, &request_id, "deleted").await;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

fn require_business(token_business: &str, path_business: &str) -> Result<(), AppError> {
    if token_business != path_business {
        return Err(AppError::Forbidden("Not a member of this business".into()));
    }
    Ok(())
}

/// Attachment rows plus the legacy single file referenced directly on the
/// request row, deduplicated by path.
async fn attachments_of(
    state: &Arc<AppState>,
    request: &BookingRequest,
) -> Result<Vec<BookingRequestFile>, AppError> {
    let mut files = state.file_repo.list_by_booking_request(&request.id).await?;

    if let Some(path) = request.file_path.as_deref().filter(|p| !p.trim().is_empty()) {
        if !files.iter().any(|f| f.file_path == path) {
            let filename = request.filename.as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path));
            files.push(BookingRequestFile::legacy(&request.id, filename, path));
        }
    }

    Ok(files)
}

/// Copies every booking attachment into the event-attachments bucket
/// under a fresh path and records an event file row. Originals stay in
/// place. Each file settles independently.
async fn migrate_attachments(
    state: &Arc<AppState>,
    request: &BookingRequest,
    event: &Event,
    owner_id: &str,
    report: &mut ApprovalReport,
) {
    let files = match attachments_of(state, request).await {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to list attachments of {}: {}", request.id, e);
            report.warnings.push("Attachments could not be listed for migration".to_string());
            return;
        }
    };
    if files.is_empty() {
        return;
    }

    let source_bucket = state.config.booking_attachments_bucket.clone();
    let target_bucket = state.config.event_attachments_bucket.clone();

    let migrations = files.iter().map(|file| {
        let state = state.clone();
        let source_bucket = source_bucket.clone();
        let target_bucket = target_bucket.clone();
        let target = EventFile::migrated_from(file, &event.id, owner_id);
        let source_path = file.file_path.clone();
        async move {
            let bytes = state.storage.download(&source_bucket, &source_path).await?;
            state.storage
                .upload(&target_bucket, &target.file_path, bytes, target.content_type.as_deref())
                .await?;
            state.file_repo.create_event_file(&target).await?;
            Ok::<(), AppError>(())
        }
    });

    for (file, result) in files.iter().zip(join_all(migrations).await) {
        match result {
            Ok(()) => report.files_migrated += 1,
            Err(e) => {
                error!("Attachment migration failed for {} ({}): {}", file.filename, file.file_path, e);
                report.files_failed += 1;
            }
        }
    }

    if report.files_failed > 0 {
        report.warnings.push(format!(
            "{} of {} attachments failed to migrate",
            report.files_failed,
            report.files_failed + report.files_migrated
        ));
    }
}

/// One confirmation per recipient, issued concurrently and awaited until
/// all settle. A failed recipient never blocks or retries the others.
async fn send_confirmations(
    state: &Arc<AppState>,
    request: &BookingRequest,
    event: &Event,
    business_id: &str,
    attendees: &[crate::domain::models::booking_request::AdditionalPerson],
    report: &mut ApprovalReport,
) {
    let recipients = collect_recipients(request, attendees);
    if recipients.is_empty() {
        warn!("Approved request {} has no email recipients", request.id);
        report.warnings.push("no email recipients".to_string());
        return;
    }

    let business = match state.business_repo.find_by_id(business_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Business profile lookup failed for {}: {}", business_id, e);
            None
        }
    };
    let business_name = business.as_ref().map(|b| b.name.clone()).unwrap_or_default();
    let business_address = business.as_ref().and_then(|b| b.address.clone());

    let sends = recipients.iter().map(|recipient| {
        let payload = BookingConfirmation {
            recipient_email: recipient.email.clone(),
            full_name: recipient.full_name.clone(),
            business_name: business_name.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            payment_status: recipient.payment_status.clone()
                .unwrap_or_else(|| crate::domain::models::event::DEFAULT_PAYMENT_STATUS.to_string()),
            payment_amount: recipient.payment_amount,
            business_address: business_address.clone(),
            language: request.language.clone(),
            event_notes: recipient.event_notes.clone(),
            event_id: event.id.clone(),
            source: "booking_approval".to_string(),
        };
        let email_service = state.email_service.clone();
        async move { email_service.send_confirmation(&payload).await }
    });

    let results = join_all(sends).await;
    let total = results.len();
    let failed = results.iter().filter(|r| r.is_err()).count();

    for (recipient, result) in recipients.iter().zip(&results) {
        if let Err(e) = result {
            error!("Confirmation email to {} failed: {}", recipient.email, e);
        }
    }

    report.emails_sent = total - failed;
    report.emails_failed = failed;

    if failed == total {
        report.warnings.push("all confirmation emails failed".to_string());
    } else if failed > 0 {
        report.warnings.push(format!("{} of {} confirmation emails failed", failed, total));
    } else {
        info!("Sent {} confirmation emails for request {}", total, request.id);
    }
}

/// Fire-and-forget from the workflow's perspective: failures are logged,
/// never surfaced.
async fn notify_change(state: &Arc<AppState>, business_id: &str, request_id: &str, status: &str) {
    let payload = serde_json::json!({
        "type": "booking_request_updated",
        "booking_request_id": request_id,
        "status": status,
    });
    if let Err(e) = state.realtime.broadcast(&format!("business:{}", business_id), payload).await {
        warn!("Realtime broadcast failed for {}: {}", request_id, e);
    }
}
