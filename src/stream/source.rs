//! Pull-style reader over an inbound chain.

use std::io;

use crate::pool::{Chain, RequestPool, SegmentId};

/// Single-pass reader over a chain held in a [`RequestPool`].
///
/// Reading drains the segments themselves: bytes handed out once are gone
/// from the chain for every later reader.
pub struct ByteSource<'p> {
    pool: &'p mut RequestPool,
    cursor: Option<SegmentId>,
    consumed: u64,
}

impl<'p> ByteSource<'p> {
    pub fn new(pool: &'p mut RequestPool, chain: Chain) -> Self {
        Self {
            pool,
            cursor: chain.head(),
            consumed: 0,
        }
    }

    /// Copy up to `dst.len()` bytes, crossing segment boundaries as needed.
    ///
    /// Stops early only after draining a final segment, so a short read means
    /// end of stream. Once the stream has ended every call returns 0. A chain
    /// whose links run out before a final segment is treated the same way,
    /// since the whole chain is materialized before reading starts.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let mut copied = 0;

        while let Some(id) = self.cursor {
            let (n, is_final) = self.pool.take(id, &mut dst[copied..]);
            copied += n;

            if copied == dst.len() || is_final {
                break;
            }
            self.cursor = self.pool.segment(id).and_then(|s| s.next());
        }

        self.consumed += copied as u64;
        copied
    }

    /// Bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl io::Read for ByteSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(ByteSource::read(self, buf))
    }
}
