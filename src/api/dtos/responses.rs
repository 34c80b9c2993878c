use serde::Serialize;

/// Structured outcome of an approval. The status transition is the
/// authoritative phase; everything after it is best-effort and reported
/// here instead of being raised.
#[derive(Serialize, Debug, Default)]
pub struct ApprovalReport {
    pub booking_request_id: String,
    pub status: String,
    pub event_id: Option<String>,
    pub event_created: bool,
    pub files_migrated: usize,
    pub files_failed: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub warnings: Vec<String>,
}

impl ApprovalReport {
    pub fn approved(booking_request_id: String) -> Self {
        Self {
            booking_request_id,
            status: "approved".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
pub struct BookingRequestFileLink {
    pub id: String,
    pub filename: String,
    pub url: String,
}
