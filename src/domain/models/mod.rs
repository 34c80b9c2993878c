pub mod auth;
pub mod booking_request;
pub mod email;
pub mod event;
pub mod file;
pub mod subscription;
pub mod user;
