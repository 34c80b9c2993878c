use crate::domain::models::file::{BookingRequestFile, EventFile};
use crate::domain::ports::FileRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteFileRepo {
    pool: SqlitePool,
}

impl SqliteFileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for SqliteFileRepo {
    async fn create_booking_request_file(&self, file: &BookingRequestFile) -> Result<BookingRequestFile, AppError> {
        sqlx::query_as::<_, BookingRequestFile>(
            "INSERT INTO booking_request_files (id, booking_request_id, filename, file_path, content_type, size, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&file.id).bind(&file.booking_request_id).bind(&file.filename).bind(&file.file_path)
            .bind(&file.content_type).bind(file.size).bind(file.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_booking_request(&self, booking_request_id: &str) -> Result<Vec<BookingRequestFile>, AppError> {
        sqlx::query_as::<_, BookingRequestFile>(
            "SELECT * FROM booking_request_files WHERE booking_request_id = ? ORDER BY created_at ASC"
        )
            .bind(booking_request_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_event_file(&self, file: &EventFile) -> Result<EventFile, AppError> {
        sqlx::query_as::<_, EventFile>(
            "INSERT INTO event_files (id, event_id, user_id, filename, file_path, content_type, size, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&file.id).bind(&file.event_id).bind(&file.user_id).bind(&file.filename)
            .bind(&file.file_path).bind(&file.content_type).bind(file.size).bind(file.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete_by_booking_request(&self, booking_request_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM booking_request_files WHERE booking_request_id = ?")
            .bind(booking_request_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
