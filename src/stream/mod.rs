//! Byte-stream adapter between request pools and the image pipeline.
//!
//! # Data Flow
//! ```text
//! inbound Chain
//!     → source.rs   ByteSource::read (pull until a short read)
//!     → [pipeline transforms the image]
//!     → sink.rs     ByteSink::write (one segment per call)
//!     → finalize.rs ResponseFinalizer::finalize
//!           mime lookup, status, content type/length
//!           policy.rs decides Content-Disposition / Link
//!           max_age.rs resolves the cache lifetime
//!           chain sealed
//!     → ResponseHead + sealed Chain handed back to the host
//! ```
//!
//! # Design Decisions
//! - Everything here is synchronous; the chain is complete before reading
//! - `ByteSink` states: empty → writing → finalized; `finalize` consumes the
//!   sink so no write can follow it
//! - The terminal marker is set once, at finalize, never by a write

pub mod context;
pub mod finalize;
pub mod max_age;
pub mod policy;
pub mod sink;
pub mod source;

pub use context::{ResponseContext, UpstreamContext};
pub use finalize::ResponseFinalizer;
pub use max_age::{parse_duration_seconds, resolve_max_age, MAX_AGE_DEFAULT};
pub use policy::HeaderPolicy;
pub use sink::ByteSink;
pub use source::ByteSource;
