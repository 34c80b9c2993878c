use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub business_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BusinessProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}
