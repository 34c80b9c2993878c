use bookwise_backend::{
    api::router::create_router,
    config::Config,
    domain::models::auth::Claims,
    domain::models::booking_request::BookingRequest,
    domain::models::email::BookingConfirmation,
    domain::models::subscription::{ProviderCheckoutSession, ProviderCustomer, ProviderSubscription},
    domain::ports::{EmailService, ObjectStorage, PaymentProvider, RealtimeNotifier},
    error::AppError,
    infra::repositories::{
        sqlite_booking_request_repo::SqliteBookingRequestRepo,
        sqlite_event_repo::SqliteEventRepo,
        sqlite_file_repo::SqliteFileRepo,
        sqlite_subscription_repo::SqliteSubscriptionRepo,
        sqlite_user_repo::{SqliteBusinessProfileRepo, SqliteUserRepo},
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Records every dispatch attempt; recipients listed in `failing` get an
/// error back instead.
#[derive(Default)]
pub struct MockEmailService {
    pub attempts: Mutex<Vec<BookingConfirmation>>,
    pub failing: Mutex<HashSet<String>>,
}

impl MockEmailService {
    pub fn fail_for(&self, email: &str) {
        self.failing.lock().unwrap().insert(email.to_string());
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.attempts.lock().unwrap().iter().map(|a| a.recipient_email.clone()).collect()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_confirmation(&self, payload: &BookingConfirmation) -> Result<(), AppError> {
        self.attempts.lock().unwrap().push(payload.clone());
        if self.failing.lock().unwrap().contains(&payload.recipient_email) {
            return Err(AppError::InternalWithMsg("mail dispatch failed".to_string()));
        }
        Ok(())
    }
}

/// In-memory bucket store keyed `bucket/path`. Paths listed in
/// `failing_downloads` error on read.
#[derive(Default)]
pub struct MockObjectStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub failing_downloads: Mutex<HashSet<String>>,
}

impl MockObjectStorage {
    fn key(bucket: &str, path: &str) -> String {
        format!("{}/{}", bucket, path)
    }

    pub fn put(&self, bucket: &str, path: &str, bytes: &[u8]) {
        self.objects.lock().unwrap().insert(Self::key(bucket, path), bytes.to_vec());
    }

    pub fn fail_download(&self, path: &str) {
        self.failing_downloads.lock().unwrap().insert(path.to_string());
    }

    pub fn paths_in(&self, bucket: &str) -> Vec<String> {
        let prefix = format!("{}/", bucket);
        self.objects.lock().unwrap().keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> Result<(), AppError> {
        self.objects.lock().unwrap().insert(Self::key(bucket, path), bytes);
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        if self.failing_downloads.lock().unwrap().contains(path) {
            return Err(AppError::InternalWithMsg("storage read failed".to_string()));
        }
        self.objects.lock().unwrap().get(&Self::key(bucket, path)).cloned()
            .ok_or(AppError::NotFound("object not found".to_string()))
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u32) -> Result<String, AppError> {
        Ok(format!("https://storage.test/sign/{}/{}?expires={}", bucket, path, ttl_secs))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError> {
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(&Self::key(bucket, path));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRealtime {
    pub messages: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl RealtimeNotifier for MockRealtime {
    async fn broadcast(&self, channel: &str, payload: Value) -> Result<(), AppError> {
        self.messages.lock().unwrap().push((channel.to_string(), payload));
        Ok(())
    }
}

/// Scriptable stand-in for the payment provider's API.
#[derive(Default)]
pub struct MockPaymentProvider {
    pub customers: Mutex<Vec<ProviderCustomer>>,
    pub subscriptions: Mutex<HashMap<String, ProviderSubscription>>,
    pub active_subscriptions: Mutex<HashMap<String, Vec<ProviderSubscription>>>,
    pub checkout_sessions: Mutex<HashMap<String, ProviderCheckoutSession>>,
    pub recent_sessions: Mutex<HashMap<String, Vec<ProviderCheckoutSession>>>,
    pub created_customer_emails: Mutex<Vec<String>>,
}

impl MockPaymentProvider {
    pub fn add_customer(&self, id: &str, email: &str) {
        self.customers.lock().unwrap().push(ProviderCustomer {
            id: id.to_string(),
            email: Some(email.to_string()),
        });
    }

    pub fn add_subscription(&self, sub: ProviderSubscription) {
        self.subscriptions.lock().unwrap().insert(sub.id.clone(), sub);
    }

    pub fn add_active_subscription(&self, customer_id: &str, sub: ProviderSubscription) {
        self.active_subscriptions.lock().unwrap()
            .entry(customer_id.to_string())
            .or_default()
            .push(sub);
    }

    pub fn add_checkout_session(&self, session: ProviderCheckoutSession) {
        self.checkout_sessions.lock().unwrap().insert(session.id.clone(), session);
    }

    pub fn add_recent_session(&self, customer_id: &str, session: ProviderCheckoutSession) {
        self.recent_sessions.lock().unwrap()
            .entry(customer_id.to_string())
            .or_default()
            .push(session);
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn get_customer(&self, customer_id: &str) -> Result<ProviderCustomer, AppError> {
        self.customers.lock().unwrap().iter()
            .find(|c| c.id == customer_id)
            .cloned()
            .ok_or(AppError::NotFound("no such customer".to_string()))
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<ProviderCustomer>, AppError> {
        Ok(self.customers.lock().unwrap().iter()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, AppError> {
        let customer = ProviderCustomer {
            id: format!("cus_{}", Uuid::new_v4().simple()),
            email: Some(email.to_string()),
        };
        self.created_customer_emails.lock().unwrap().push(email.to_string());
        self.customers.lock().unwrap().push(customer.clone());
        Ok(customer)
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<ProviderSubscription, AppError> {
        self.subscriptions.lock().unwrap().get(subscription_id).cloned()
            .ok_or(AppError::NotFound("no such subscription".to_string()))
    }

    async fn list_active_subscriptions(&self, customer_id: &str) -> Result<Vec<ProviderSubscription>, AppError> {
        Ok(self.active_subscriptions.lock().unwrap().get(customer_id).cloned().unwrap_or_default())
    }

    async fn get_checkout_session(&self, session_id: &str) -> Result<ProviderCheckoutSession, AppError> {
        self.checkout_sessions.lock().unwrap().get(session_id).cloned()
            .ok_or(AppError::NotFound("no such session".to_string()))
    }

    async fn list_recent_checkout_sessions(&self, customer_id: &str) -> Result<Vec<ProviderCheckoutSession>, AppError> {
        Ok(self.recent_sessions.lock().unwrap().get(customer_id).cloned().unwrap_or_default())
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<MockEmailService>,
    pub storage: Arc<MockObjectStorage>,
    pub realtime: Arc<MockRealtime>,
    pub payments: Arc<MockPaymentProvider>,
    encoding_key: EncodingKey,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&ring::rand::SystemRandom::new()).unwrap();
        let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
        let public_key_b64 = general_purpose::STANDARD.encode(key_pair.public_key().as_ref());
        let encoding_key = EncodingKey::from_ed_der(pkcs8.as_ref());

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            auth_refresh_url: "http://localhost".to_string(),
            auth_refresh_token: "refresh".to_string(),
            storage_service_url: "http://localhost".to_string(),
            storage_service_key: "key".to_string(),
            realtime_service_url: "http://localhost".to_string(),
            realtime_service_key: "key".to_string(),
            stripe_api_url: "http://localhost".to_string(),
            stripe_secret_key: "sk_test".to_string(),
            jwt_public_key: public_key_b64,
            booking_attachments_bucket: "booking_attachments".to_string(),
            event_attachments_bucket: "event_attachments".to_string(),
        };

        let email = Arc::new(MockEmailService::default());
        let storage = Arc::new(MockObjectStorage::default());
        let realtime = Arc::new(MockRealtime::default());
        let payments = Arc::new(MockPaymentProvider::default());

        let state = Arc::new(AppState {
            config,
            booking_request_repo: Arc::new(SqliteBookingRequestRepo::new(pool.clone())),
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            file_repo: Arc::new(SqliteFileRepo::new(pool.clone())),
            subscription_repo: Arc::new(SqliteSubscriptionRepo::new(pool.clone())),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            business_repo: Arc::new(SqliteBusinessProfileRepo::new(pool.clone())),
            email_service: email.clone(),
            storage: storage.clone(),
            realtime: realtime.clone(),
            payment_provider: payments.clone(),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            storage,
            realtime,
            payments,
            encoding_key,
        }
    }

    /// Mints an access token the way the external identity service would.
    pub fn auth(&self, user_id: &str, business_id: &str) -> AuthHeaders {
        let csrf_token = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            iss: "https://auth.bookwise.test".to_string(),
            sub: user_id.to_string(),
            aud: "bookwise-frontend".to_string(),
            exp: now + 3600,
            iat: now,
            jti: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .expect("failed to sign test token");

        AuthHeaders { access_token, csrf_token }
    }

    pub async fn seed_user(&self, id: &str, email: &str, business_id: &str) {
        sqlx::query("INSERT INTO users (id, email, business_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(email)
            .bind(business_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .expect("failed to seed user");
    }

    pub async fn seed_business(&self, id: &str, user_id: &str, name: &str, address: Option<&str>) {
        sqlx::query("INSERT INTO business_profiles (id, user_id, name, address, contact_email, created_at) VALUES (?, ?, ?, ?, NULL, ?)")
            .bind(id)
            .bind(user_id)
            .bind(name)
            .bind(address)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .expect("failed to seed business profile");
    }

    pub async fn seed_booking_request(&self, request: &BookingRequest) -> BookingRequest {
        self.state.booking_request_repo.create(request).await
            .expect("failed to seed booking request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
