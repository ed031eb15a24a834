//! Segment arena scoped to a single request.

use crate::config::PoolConfig;
use crate::error::{StreamError, StreamResult};
use crate::pool::chain::{Chain, SegmentId};

/// One contiguous range of the arena.
///
/// `[pos, end)` is the unread part. Input segments advance `pos` as they are
/// drained; output segments are created fully written with `pos == start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    start: usize,
    pos: usize,
    end: usize,
    next: Option<SegmentId>,
    is_final: bool,
}

impl Segment {
    /// Payload size in bytes, independent of how much has been read.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// True for the last segment of a logical message.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }
}

/// Arena that owns every segment allocated while serving one request.
///
/// Dropping the pool invalidates every [`SegmentId`] and [`Chain`] built from
/// it at once.
#[derive(Debug)]
pub struct RequestPool {
    arena: Vec<u8>,
    segments: Vec<Segment>,
    max_bytes: usize,
    max_segments: usize,
}

impl RequestPool {
    /// Create a pool with the configured budgets.
    pub fn new(config: &PoolConfig) -> Self {
        Self::with_limits(config.max_bytes, config.max_segments)
    }

    pub fn with_limits(max_bytes: usize, max_segments: usize) -> Self {
        Self {
            arena: Vec::new(),
            segments: Vec::new(),
            max_bytes,
            max_segments,
        }
    }

    /// Total payload bytes handed out so far.
    pub fn allocated_bytes(&self) -> usize {
        self.arena.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Allocate one unlinked segment holding a copy of `data`.
    ///
    /// Both budgets are checked before anything is reserved, so a failed
    /// allocation leaves the pool untouched.
    pub(crate) fn allocate(&mut self, data: &[u8]) -> StreamResult<SegmentId> {
        let available = self.max_bytes.saturating_sub(self.arena.len());
        if data.len() > available {
            return Err(StreamError::ResourceExhausted {
                requested: data.len(),
                available,
                limit: self.max_bytes,
            });
        }
        if self.segments.len() >= self.max_segments {
            return Err(StreamError::SegmentLimit {
                limit: self.max_segments,
            });
        }

        let start = self.arena.len();
        self.arena.extend_from_slice(data);
        let id = SegmentId::new(self.segments.len());
        self.segments.push(Segment {
            start,
            pos: start,
            end: self.arena.len(),
            next: None,
            is_final: false,
        });
        Ok(id)
    }

    pub(crate) fn link(&mut self, prev: SegmentId, next: SegmentId) {
        self.segments[prev.index()].next = Some(next);
    }

    /// Mark `id` as the end of its message and terminate the link after it.
    pub(crate) fn seal(&mut self, id: SegmentId) {
        let segment = &mut self.segments[id.index()];
        segment.next = None;
        segment.is_final = true;
    }

    /// Copy unread bytes of `id` into `dst`, advancing its cursor.
    ///
    /// Returns the number of bytes copied and whether the segment is final.
    pub(crate) fn take(&mut self, id: SegmentId, dst: &mut [u8]) -> (usize, bool) {
        let segment = &mut self.segments[id.index()];
        let n = segment.remaining().min(dst.len());
        dst[..n].copy_from_slice(&self.arena[segment.pos..segment.pos + n]);
        segment.pos += n;
        (n, segment.is_final)
    }

    /// Unread bytes of a segment.
    pub fn unread(&self, id: SegmentId) -> &[u8] {
        match self.segment(id) {
            Some(segment) => &self.arena[segment.pos..segment.end],
            None => &[],
        }
    }

    /// Walk a chain from its head, stopping after the final segment.
    pub fn segments(&self, chain: &Chain) -> Segments<'_> {
        Segments {
            pool: self,
            cursor: chain.head(),
        }
    }

    /// Concatenate the unread bytes of every segment in `chain`.
    pub fn copy_chain(&self, chain: &Chain) -> Vec<u8> {
        let len = self.segments(chain).map(|(_, s)| s.remaining()).sum();
        let mut out = Vec::with_capacity(len);
        for (id, _) in self.segments(chain) {
            out.extend_from_slice(self.unread(id));
        }
        out
    }

    /// Build a sealed chain with one segment per chunk.
    pub fn chain_from_chunks<I, B>(&mut self, chunks: I) -> StreamResult<Chain>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut builder = crate::pool::ChainBuilder::new();
        for chunk in chunks {
            builder.push(self, chunk.as_ref())?;
        }
        Ok(builder.seal(self))
    }
}

/// Iterator over the segments of a chain.
pub struct Segments<'p> {
    pool: &'p RequestPool,
    cursor: Option<SegmentId>,
}

impl<'p> Iterator for Segments<'p> {
    type Item = (SegmentId, &'p Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let segment = self.pool.segment(id)?;
        self.cursor = if segment.is_final() {
            None
        } else {
            segment.next()
        };
        Some((id, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_copies_payload() {
        let mut pool = RequestPool::with_limits(64, 8);
        let id = pool.allocate(b"hello").unwrap();

        assert_eq!(pool.unread(id), b"hello");
        assert_eq!(pool.allocated_bytes(), 5);
        assert_eq!(pool.segment_count(), 1);

        let segment = pool.segment(id).unwrap();
        assert_eq!(segment.len(), 5);
        assert!(!segment.is_final());
        assert!(segment.next().is_none());
    }

    #[test]
    fn test_byte_budget_exhausted() {
        let mut pool = RequestPool::with_limits(8, 8);
        pool.allocate(b"12345").unwrap();

        let err = pool.allocate(b"6789").unwrap_err();
        assert_eq!(
            err,
            StreamError::ResourceExhausted {
                requested: 4,
                available: 3,
                limit: 8
            }
        );
        // Nothing was reserved by the failed call
        assert_eq!(pool.allocated_bytes(), 5);
        assert_eq!(pool.segment_count(), 1);
    }

    #[test]
    fn test_segment_budget_exhausted() {
        let mut pool = RequestPool::with_limits(1024, 2);
        pool.allocate(b"a").unwrap();
        pool.allocate(b"b").unwrap();

        let err = pool.allocate(b"c").unwrap_err();
        assert_eq!(err, StreamError::SegmentLimit { limit: 2 });
        assert_eq!(pool.allocated_bytes(), 2);
    }

    #[test]
    fn test_take_advances_cursor() {
        let mut pool = RequestPool::with_limits(64, 8);
        let chain = pool.chain_from_chunks([b"abcdef"]).unwrap();
        let id = chain.head().unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(pool.take(id, &mut buf), (4, true));
        assert_eq!(&buf, b"abcd");
        assert_eq!(pool.unread(id), b"ef");
        assert_eq!(pool.segment(id).unwrap().len(), 6);

        assert_eq!(pool.take(id, &mut buf), (2, true));
        assert_eq!(pool.take(id, &mut buf), (0, true));
    }

    #[test]
    fn test_copy_chain_follows_links() {
        let mut pool = RequestPool::with_limits(64, 8);
        let chain = pool
            .chain_from_chunks([&b"ab"[..], &b""[..], &b"cde"[..]])
            .unwrap();

        assert_eq!(pool.segments(&chain).count(), 3);
        assert_eq!(pool.copy_chain(&chain), b"abcde");

        let finals: Vec<bool> = pool.segments(&chain).map(|(_, s)| s.is_final()).collect();
        assert_eq!(finals, vec![false, false, true]);
    }

    #[test]
    fn test_unknown_segment_is_empty() {
        let pool = RequestPool::with_limits(64, 8);
        assert!(pool.segment(SegmentId::new(3)).is_none());
        assert!(pool.unread(SegmentId::new(3)).is_empty());
    }
}
