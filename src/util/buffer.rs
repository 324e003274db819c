//! Reference-counted plane storage

use bytes::{Bytes, BytesMut};

/// An immutable, reference-counted buffer holding one plane's samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Bytes,
}

impl Buffer {
    /// Create a buffer from a vector
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Buffer {
            data: Bytes::from(vec),
        }
    }

    /// Create an empty buffer
    pub fn empty() -> Self {
        Buffer { data: Bytes::new() }
    }

    /// Get the length of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a slice of the buffer data
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Duplicate the contents into a new writable buffer
    pub fn to_mut(&self) -> BufferRef {
        BufferRef {
            data: BytesMut::from(self.as_slice()),
        }
    }
}

/// A writable buffer, frozen into a [`Buffer`] once the frame is finished
#[derive(Debug)]
pub struct BufferRef {
    data: BytesMut,
}

impl BufferRef {
    /// Allocate a zero-filled buffer
    pub fn zeroed(len: usize) -> Self {
        BufferRef {
            data: BytesMut::zeroed(len),
        }
    }

    /// Get the length of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get mutable access to the buffer
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get immutable access to the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Freeze the buffer into an immutable Buffer
    pub fn freeze(self) -> Buffer {
        Buffer {
            data: self.data.freeze(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buf = Buffer::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        assert!(Buffer::empty().is_empty());
    }

    #[test]
    fn test_copy_on_write() {
        let buf = Buffer::from_vec(vec![7; 8]);
        let mut copy = buf.to_mut();
        copy.as_mut_slice()[0] = 0;

        assert_eq!(buf.as_slice()[0], 7);
        assert_eq!(copy.freeze().as_slice()[0], 0);
    }

    #[test]
    fn test_zeroed() {
        let buf = BufferRef::zeroed(16);
        assert_eq!(buf.len(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }
}
