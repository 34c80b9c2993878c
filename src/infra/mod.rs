pub mod email;
pub mod factory;
pub mod payments;
pub mod realtime;
pub mod repositories;
pub mod storage;
