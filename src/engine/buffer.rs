// src/engine/buffer.rs

/// Grow-only read buffer.
///
/// Sized to the channel's reported pending byte count before each read.
/// It never shrinks, so steady traffic stops allocating after the first
/// few cycles.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    bytes: Vec<u8>,
}

impl ReadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Usable size in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Make room for at least `needed` bytes. Returns `true` if the buffer
    /// had to grow.
    pub fn ensure(&mut self, needed: usize) -> bool {
        if needed <= self.bytes.len() {
            return false;
        }
        self.bytes.resize(needed, 0);
        true
    }

    /// The first `len` bytes, for the channel to fill.
    pub fn region_mut(&mut self, len: usize) -> &mut [u8] {
        let len = len.min(self.bytes.len());
        &mut self.bytes[..len]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
