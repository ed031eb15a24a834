//! Request-scoped buffer memory.
//!
//! # Data Flow
//! ```text
//! request arrives
//!     → RequestPool created (one per request)
//!     → host pushes body chunks  → inbound Chain  (arena.rs, chain.rs)
//!     → stream::ByteSink appends → outbound Chain
//!     → response sent
//!     → RequestPool dropped: every segment and chain index dies with it
//! ```
//!
//! # Design Decisions
//! - Segments are index-addressed ranges of one byte arena; there is no
//!   per-segment deallocation
//! - Chains are singly linked through segment indices
//! - Byte and segment budgets stand in for allocation failure

pub mod arena;
pub mod chain;

pub use arena::{RequestPool, Segment};
pub use chain::{Chain, ChainBuilder, SegmentId};
