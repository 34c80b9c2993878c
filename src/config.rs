use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub auth_refresh_url: String,
    pub auth_refresh_token: String,
    pub storage_service_url: String,
    pub storage_service_key: String,
    pub realtime_service_url: String,
    pub realtime_service_key: String,
    pub stripe_api_url: String,
    pub stripe_secret_key: String,
    pub jwt_public_key: String, // Ed25519 public key (PEM or Base64 DER)
    pub booking_attachments_bucket: String,
    pub event_attachments_bucket: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/functions/send-booking-confirmation".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            auth_refresh_url: env::var("AUTH_REFRESH_URL").unwrap_or_else(|_| "http://localhost:8000/auth/token?grant_type=refresh_token".to_string()),
            auth_refresh_token: env::var("AUTH_REFRESH_TOKEN").unwrap_or_default(),
            storage_service_url: env::var("STORAGE_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/storage".to_string()),
            storage_service_key: env::var("STORAGE_SERVICE_KEY").unwrap_or_default(),
            realtime_service_url: env::var("REALTIME_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/realtime/broadcast".to_string()),
            realtime_service_key: env::var("REALTIME_SERVICE_KEY").unwrap_or_default(),
            stripe_api_url: env::var("STRIPE_API_URL").unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            booking_attachments_bucket: env::var("BOOKING_ATTACHMENTS_BUCKET").unwrap_or_else(|_| "booking_attachments".to_string()),
            event_attachments_bucket: env::var("EVENT_ATTACHMENTS_BUCKET").unwrap_or_else(|_| "event_attachments".to_string()),
        }
    }
}
