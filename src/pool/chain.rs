//! Index-linked buffer chains.

use crate::error::StreamResult;
use crate::pool::arena::RequestPool;

/// Index of a segment inside its [`RequestPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(usize);

impl SegmentId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Head of a singly linked list of segments.
///
/// A chain is complete once its last segment is final. Running off the end of
/// the links without meeting a final segment means more data is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chain {
    head: Option<SegmentId>,
}

impl Chain {
    pub const fn empty() -> Self {
        Self { head: None }
    }

    pub fn head(&self) -> Option<SegmentId> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Appends segments to a chain in O(1) through a tail cursor.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    head: Option<SegmentId>,
    tail: Option<SegmentId>,
    total_len: u64,
    segments: usize,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a segment for `data` and link it after the current tail.
    pub fn push(&mut self, pool: &mut RequestPool, data: &[u8]) -> StreamResult<SegmentId> {
        let id = pool.allocate(data)?;
        match self.tail {
            Some(tail) => pool.link(tail, id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.total_len += data.len() as u64;
        self.segments += 1;
        Ok(id)
    }

    /// Sum of every pushed payload.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// The chain so far, without a terminal marker.
    pub fn open_chain(&self) -> Chain {
        Chain { head: self.head }
    }

    /// Mark the tail final and hand out the finished chain.
    pub fn seal(self, pool: &mut RequestPool) -> Chain {
        if let Some(tail) = self.tail {
            pool.seal(tail);
        }
        Chain { head: self.head }
    }
}
