use crate::domain::models::booking_request::BookingRequest;
use crate::domain::ports::BookingRequestRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteBookingRequestRepo {
    pool: SqlitePool,
}

impl SqliteBookingRequestRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRequestRepository for SqliteBookingRequestRepo {
    async fn create(&self, request: &BookingRequest) -> Result<BookingRequest, AppError> {
        sqlx::query_as::<_, BookingRequest>(
            "INSERT INTO booking_requests (id, business_id, requester_name, requester_email, requester_phone, title, start_date, end_date, status, payment_status, payment_amount, additional_persons, user_surname, social_network_link, filename, file_path, language, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&request.id).bind(&request.business_id).bind(&request.requester_name).bind(&request.requester_email)
            .bind(&request.requester_phone).bind(&request.title).bind(request.start_date).bind(request.end_date)
            .bind(&request.status).bind(&request.payment_status).bind(request.payment_amount).bind(&request.additional_persons)
            .bind(&request.user_surname).bind(&request.social_network_link).bind(&request.filename).bind(&request.file_path)
            .bind(&request.language).bind(request.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingRequest>, AppError> {
        sqlx::query_as::<_, BookingRequest>("SELECT * FROM booking_requests WHERE business_id = ? AND id = ?")
            .bind(business_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_business(&self, business_id: &str, status: Option<&str>) -> Result<Vec<BookingRequest>, AppError> {
        match status {
            Some(status) => sqlx::query_as::<_, BookingRequest>(
                "SELECT * FROM booking_requests WHERE business_id = ? AND status = ? ORDER BY start_date ASC"
            )
                .bind(business_id).bind(status)
                .fetch_all(&self.pool).await.map_err(AppError::Database),
            None => sqlx::query_as::<_, BookingRequest>(
                "SELECT * FROM booking_requests WHERE business_id = ? ORDER BY start_date ASC"
            )
                .bind(business_id)
                .fetch_all(&self.pool).await.map_err(AppError::Database),
        }
    }

    async fn list_approved_in_range(&self, business_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BookingRequest>, AppError> {
        sqlx::query_as::<_, BookingRequest>(
            "SELECT * FROM booking_requests WHERE business_id = ? AND status = 'approved' AND start_date < ? AND end_date > ?"
        )
            .bind(business_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition_status(&self, business_id: &str, id: &str, from: &str, to: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE booking_requests SET status = ? WHERE business_id = ? AND id = ? AND status = ?"
        )
            .bind(to).bind(business_id).bind(id).bind(from)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, business_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM booking_requests WHERE id = ? AND business_id = ?")
            .bind(id).bind(business_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking request not found".into()));
        }
        Ok(())
    }
}
