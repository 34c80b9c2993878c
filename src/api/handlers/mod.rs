pub mod booking_request;
pub mod health;
pub mod subscription;
