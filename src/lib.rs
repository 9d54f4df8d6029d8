pub mod canon;
pub mod config;
pub mod http;
pub mod observability;
