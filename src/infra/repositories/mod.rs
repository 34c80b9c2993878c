pub mod sqlite_booking_request_repo;
pub mod sqlite_event_repo;
pub mod sqlite_file_repo;
pub mod sqlite_subscription_repo;
pub mod sqlite_user_repo;
