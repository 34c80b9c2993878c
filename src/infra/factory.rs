use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::payments::stripe_client::StripeClient;
use crate::infra::realtime::http_broadcast::HttpBroadcastService;
use crate::infra::storage::http_object_storage::HttpObjectStorage;
use crate::infra::repositories::{
    sqlite_booking_request_repo::SqliteBookingRequestRepo,
    sqlite_event_repo::SqliteEventRepo,
    sqlite_file_repo::SqliteFileRepo,
    sqlite_subscription_repo::SqliteSubscriptionRepo,
    sqlite_user_repo::{SqliteBusinessProfileRepo, SqliteUserRepo},
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
        config.auth_refresh_url.clone(),
        config.auth_refresh_token.clone(),
    ));

    let storage = Arc::new(HttpObjectStorage::new(
        config.storage_service_url.clone(),
        config.storage_service_key.clone(),
    ));

    let realtime = Arc::new(HttpBroadcastService::new(
        config.realtime_service_url.clone(),
        config.realtime_service_key.clone(),
    ));

    let payment_provider = Arc::new(StripeClient::new(
        config.stripe_api_url.clone(),
        config.stripe_secret_key.clone(),
    ));

    AppState {
        config: config.clone(),
        booking_request_repo: Arc::new(SqliteBookingRequestRepo::new(pool.clone())),
        event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
        file_repo: Arc::new(SqliteFileRepo::new(pool.clone())),
        subscription_repo: Arc::new(SqliteSubscriptionRepo::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        business_repo: Arc::new(SqliteBusinessProfileRepo::new(pool.clone())),
        email_service,
        storage,
        realtime,
        payment_provider,
    }
}

async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
