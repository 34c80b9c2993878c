use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    BookingRequestRepository, BusinessProfileRepository, EmailService, EventRepository,
    FileRepository, ObjectStorage, PaymentProvider, RealtimeNotifier, SubscriptionRepository,
    UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_request_repo: Arc<dyn BookingRequestRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub file_repo: Arc<dyn FileRepository>,
    pub subscription_repo: Arc<dyn SubscriptionRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub business_repo: Arc<dyn BusinessProfileRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub realtime: Arc<dyn RealtimeNotifier>,
    pub payment_provider: Arc<dyn PaymentProvider>,
}
