//! Append-only writer that builds an outbound chain.

use std::io;

use crate::error::StreamResult;
use crate::pool::{Chain, ChainBuilder, RequestPool};

/// Collects pipeline output into a chain, one segment per write.
///
/// The chain stays open until [`ResponseFinalizer::finalize`] consumes the
/// sink; writes never set the terminal marker themselves.
///
/// [`ResponseFinalizer::finalize`]: crate::stream::ResponseFinalizer::finalize
pub struct ByteSink<'p> {
    pool: &'p mut RequestPool,
    chain: ChainBuilder,
}

impl<'p> ByteSink<'p> {
    pub fn new(pool: &'p mut RequestPool) -> Self {
        Self {
            pool,
            chain: ChainBuilder::new(),
        }
    }

    /// Append `data` as a new segment sized exactly to it.
    ///
    /// On allocation failure nothing is appended and the running length is
    /// unchanged; the caller must abandon the response.
    pub fn write(&mut self, data: &[u8]) -> StreamResult<usize> {
        if let Err(err) = self.chain.push(self.pool, data) {
            tracing::warn!(
                requested = data.len(),
                written = self.chain.total_len(),
                error = %err,
                "Output allocation failed"
            );
            crate::observability::metrics::record_allocation_failure();
            return Err(err);
        }
        tracing::trace!(
            len = data.len(),
            total = self.chain.total_len(),
            "Appended output segment"
        );
        Ok(data.len())
    }

    /// Sum of every successful write.
    pub fn total_length(&self) -> u64 {
        self.chain.total_len()
    }

    pub fn segment_count(&self) -> usize {
        self.chain.segment_count()
    }

    /// Terminate the chain and hand it over. Only the finalizer calls this.
    pub(crate) fn seal(self) -> Chain {
        self.chain.seal(self.pool)
    }
}

impl io::Write for ByteSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ByteSink::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::pool::SegmentId;

    #[test]
    fn test_each_write_is_one_segment() {
        let mut pool = RequestPool::with_limits(1024, 16);
        let mut sink = ByteSink::new(&mut pool);

        assert_eq!(sink.write(b"GIF89a").unwrap(), 6);
        assert_eq!(sink.write(b"").unwrap(), 0);
        assert_eq!(sink.write(b"\x01\x02").unwrap(), 2);

        assert_eq!(sink.total_length(), 8);
        assert_eq!(sink.segment_count(), 3);

        let chain = sink.seal();
        let lens: Vec<usize> = pool.segments(&chain).map(|(_, s)| s.len()).collect();
        assert_eq!(lens, vec![6, 0, 2]);
        assert_eq!(pool.copy_chain(&chain), b"GIF89a\x01\x02");
    }

    #[test]
    fn test_no_segment_is_final_before_seal() {
        let mut pool = RequestPool::with_limits(1024, 16);
        let mut sink = ByteSink::new(&mut pool);
        sink.write(b"a").unwrap();
        sink.write(b"b").unwrap();
        assert_eq!(pool.segment_count(), 2);
        for index in 0..2 {
            let segment = pool.segment(SegmentId::new(index)).unwrap();
            assert!(!segment.is_final());
        }
    }

    #[test]
    fn test_allocation_failure_keeps_length() {
        let mut pool = RequestPool::with_limits(4, 16);
        let mut sink = ByteSink::new(&mut pool);
        sink.write(b"abc").unwrap();

        let err = sink.write(b"defg").unwrap_err();
        assert!(matches!(err, StreamError::ResourceExhausted { .. }));
        assert_eq!(sink.total_length(), 3);
        assert_eq!(sink.segment_count(), 1);

        let chain = sink.seal();
        assert_eq!(pool.copy_chain(&chain), b"abc");
    }

    #[test]
    fn test_io_write_reports_out_of_memory() {
        use std::io::Write;

        let mut pool = RequestPool::with_limits(1024, 1);
        let mut sink = ByteSink::new(&mut pool);
        sink.write_all(b"first").unwrap();

        let err = sink.write_all(b"second").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
    }
}
