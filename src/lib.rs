//! Image delivery service built around a per-request byte pool.

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod pipeline;
pub mod pool;
pub mod stream;
pub mod upstream;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
