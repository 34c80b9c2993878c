use crate::domain::models::subscription::Subscription;
use crate::domain::ports::SubscriptionRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSubscriptionRepo {
    pool: SqlitePool,
}

impl SqliteSubscriptionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteSubscriptionRepo {
    async fn upsert_by_email(&self, subscription: &Subscription) -> Result<Subscription, AppError> {
        // COALESCE keeps identifiers learned by earlier deliveries when a
        // later payload arrives without them.
        sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (user_id, email, status, stripe_customer_id, stripe_subscription_id, plan_type, current_period_start, current_period_end, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                 user_id = COALESCE(excluded.user_id, subscriptions.user_id),
                 status = excluded.status,
                 stripe_customer_id = COALESCE(excluded.stripe_customer_id, subscriptions.stripe_customer_id),
                 stripe_subscription_id = COALESCE(excluded.stripe_subscription_id, subscriptions.stripe_subscription_id),
                 plan_type = COALESCE(excluded.plan_type, subscriptions.plan_type),
                 current_period_start = COALESCE(excluded.current_period_start, subscriptions.current_period_start),
                 current_period_end = COALESCE(excluded.current_period_end, subscriptions.current_period_end),
                 updated_at = excluded.updated_at
             RETURNING *"
        )
            .bind(&subscription.user_id).bind(&subscription.email).bind(&subscription.status)
            .bind(&subscription.stripe_customer_id).bind(&subscription.stripe_subscription_id)
            .bind(&subscription.plan_type).bind(subscription.current_period_start)
            .bind(subscription.current_period_end).bind(subscription.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscription>, AppError> {
        sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_customer_id(&self, stripe_customer_id: &str) -> Result<Option<Subscription>, AppError> {
        sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE stripe_customer_id = ?")
            .bind(stripe_customer_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
