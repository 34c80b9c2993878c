use crate::domain::models::user::{BusinessProfile, User};
use crate::domain::ports::{BusinessProfileRepository, UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}

pub struct SqliteBusinessProfileRepo {
    pool: SqlitePool,
}

impl SqliteBusinessProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessProfileRepository for SqliteBusinessProfileRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<BusinessProfile>, AppError> {
        sqlx::query_as::<_, BusinessProfile>("SELECT * FROM business_profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
