use crate::domain::models::booking_request::AdditionalPerson;
use crate::domain::models::event::{Customer, Event};
use crate::domain::ports::EventRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn save_event_with_persons(&self, event: &Event, persons: &[AdditionalPerson]) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, user_id, title, start_date, end_date, user_surname, user_number, social_network_link, event_notes, type, payment_status, payment_amount, parent_event_id, is_recurring, deleted_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&event.id).bind(&event.user_id).bind(&event.title).bind(event.start_date).bind(event.end_date)
            .bind(&event.user_surname).bind(&event.user_number).bind(&event.social_network_link).bind(&event.event_notes)
            .bind(&event.event_type).bind(&event.payment_status).bind(event.payment_amount)
            .bind(&event.parent_event_id).bind(event.is_recurring).bind(event.deleted_at).bind(event.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for person in persons {
            let customer = Customer::from_person(&created.id, person);
            sqlx::query(
                "INSERT INTO customers (id, event_id, user_surname, user_number, social_network_link, payment_status, payment_amount, type, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(&customer.id).bind(&customer.event_id).bind(&customer.user_surname).bind(&customer.user_number)
                .bind(&customer.social_network_link).bind(&customer.payment_status).bind(customer.payment_amount)
                .bind(&customer.customer_type).bind(customer.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn list_active_in_range(&self, user_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE user_id = ? AND deleted_at IS NULL AND start_date < ? AND end_date > ?"
        )
            .bind(user_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
