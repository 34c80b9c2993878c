use crate::domain::models::{
    booking_request::{AdditionalPerson, BookingRequest},
    email::BookingConfirmation,
    event::Event,
    file::{BookingRequestFile, EventFile},
    subscription::{ProviderCheckoutSession, ProviderCustomer, ProviderSubscription, Subscription},
    user::{BusinessProfile, User},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait BookingRequestRepository: Send + Sync {
    async fn create(&self, request: &BookingRequest) -> Result<BookingRequest, AppError>;
    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingRequest>, AppError>;
    async fn list_by_business(&self, business_id: &str, status: Option<&str>) -> Result<Vec<BookingRequest>, AppError>;
    /// Approved requests of the business whose window intersects `[start, end)`.
    async fn list_approved_in_range(&self, business_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BookingRequest>, AppError>;
    /// Compare-and-set on status. Returns false when another writer got
    /// there first (0 rows updated).
    async fn transition_status(&self, business_id: &str, id: &str, from: &str, to: &str) -> Result<bool, AppError>;
    async fn delete(&self, business_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Creates the event row and one customer row per additional person
    /// as a single transaction.
    async fn save_event_with_persons(&self, event: &Event, persons: &[AdditionalPerson]) -> Result<Event, AppError>;
    /// Non-deleted events of the owner whose window intersects `[start, end)`.
    async fn list_active_in_range(&self, user_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create_booking_request_file(&self, file: &BookingRequestFile) -> Result<BookingRequestFile, AppError>;
    async fn list_by_booking_request(&self, booking_request_id: &str) -> Result<Vec<BookingRequestFile>, AppError>;
    async fn create_event_file(&self, file: &EventFile) -> Result<EventFile, AppError>;
    async fn delete_by_booking_request(&self, booking_request_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait BusinessProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<BusinessProfile>, AppError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert-or-update keyed on `email`. Identifier columns already
    /// present on the row are never cleared by an upsert carrying NULLs.
    async fn upsert_by_email(&self, subscription: &Subscription) -> Result<Subscription, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscription>, AppError>;
    async fn find_by_customer_id(&self, stripe_customer_id: &str) -> Result<Option<Subscription>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_confirmation(&self, payload: &BookingConfirmation) -> Result<(), AppError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), AppError>;
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError>;
    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u32) -> Result<String, AppError>;
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError>;
}

#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    async fn broadcast(&self, channel: &str, payload: Value) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> Result<ProviderCustomer, AppError>;
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<ProviderCustomer>, AppError>;
    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, AppError>;
    async fn get_subscription(&self, subscription_id: &str) -> Result<ProviderSubscription, AppError>;
    async fn list_active_subscriptions(&self, customer_id: &str) -> Result<Vec<ProviderSubscription>, AppError>;
    async fn get_checkout_session(&self, session_id: &str) -> Result<ProviderCheckoutSession, AppError>;
    async fn list_recent_checkout_sessions(&self, customer_id: &str) -> Result<Vec<ProviderCheckoutSession>, AppError>;
}
