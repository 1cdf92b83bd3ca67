//! Last-value cache for pull-style reads
//!
//! Stores the most recently transmitted buffer so a peer can read the
//! newest message on demand, independent of push delivery.

/// Capacity of the last-value cache. Longer messages are truncated
/// silently.
pub const LAST_VALUE_CAPACITY: usize = 200;

pub(crate) struct LastValue {
    len: usize,
    buf: [u8; LAST_VALUE_CAPACITY],
}

impl LastValue {
    pub(crate) const fn new() -> Self {
        Self {
            len: 0,
            buf: [0; LAST_VALUE_CAPACITY],
        }
    }

    /// Overwrite the cache with `data`, truncated to capacity.
    pub(crate) fn record(&mut self, data: &[u8]) {
        self.len = data.len().min(LAST_VALUE_CAPACITY);
        self.buf[..self.len].copy_from_slice(&data[..self.len]);
    }

    /// Copy the cached value into `out`, returning the number of bytes
    /// written (bounded by both the cached length and `out.len()`).
    pub(crate) fn read_into(&self, out: &mut [u8]) -> usize {
        let n = self.len.min(out.len());
        out[..n].copy_from_slice(&self.buf[..n]);
        n
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read() {
        let mut cache = LastValue::new();
        cache.record(b"hello");
        let mut out = [0u8; 16];
        let n = cache.read_into(&mut out);
        assert_eq!(&out[..n], b"hello");
    }

    #[test]
    fn test_overwrite() {
        let mut cache = LastValue::new();
        cache.record(b"first message");
        cache.record(b"second");
        let mut out = [0u8; 32];
        let n = cache.read_into(&mut out);
        assert_eq!(&out[..n], b"second");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut cache = LastValue::new();
        let big = [0xAB; LAST_VALUE_CAPACITY + 50];
        cache.record(&big);
        assert_eq!(cache.len(), LAST_VALUE_CAPACITY);
    }

    #[test]
    fn test_read_bounded_by_output() {
        let mut cache = LastValue::new();
        cache.record(b"0123456789");
        let mut out = [0u8; 4];
        assert_eq!(cache.read_into(&mut out), 4);
        assert_eq!(&out, b"0123");
    }
}
