//! Growable byte buffer for decoder residue
//!
//! Bytes are appended at the end and consumed from the front. Consumed space
//! is reclaimed by [`ByteBuffer::compact`], which shifts the unread tail to
//! the start of the allocation.

/// Byte buffer with a read cursor
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    /// Read position into `data`
    pos: usize,
}

impl ByteBuffer {
    /// Create an empty buffer with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Append bytes, growing the allocation if the unread tail plus `bytes`
    /// does not fit
    pub fn extend(&mut self, bytes: &[u8]) {
        if self.data.len() + bytes.len() > self.data.capacity() && self.pos > 0 {
            self.compact();
        }
        self.data.extend_from_slice(bytes);
    }

    /// Unread bytes
    pub fn readable(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if there are no unread bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated capacity
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Mark `n` bytes as read
    pub fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    /// Move the unread tail to the front of the allocation
    pub fn compact(&mut self) {
        if self.pos > 0 {
            self.data.drain(..self.pos);
            self.pos = 0;
        }
    }

    /// Discard all bytes
    pub fn clear(&mut self) {
        self.data.clear();
        self.pos = 0;
    }
}
