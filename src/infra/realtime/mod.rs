pub mod http_broadcast;
