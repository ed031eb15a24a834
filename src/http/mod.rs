//! HTTP host for the image adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handlers)
//!     → request.rs (request ID)
//!     → query.rs (arguments)
//!     → [pool, stream adapter, pipeline]
//!     → headers.rs + response.rs (response head)
//!     → Send to client
//! ```

pub mod error;
pub mod headers;
pub mod mime;
pub mod query;
pub mod request;
pub mod response;
pub mod server;

pub use error::HandlerError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ResponseHead;
pub use server::HttpServer;
