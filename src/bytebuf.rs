//! Growable byte buffer with little/big-endian integer helpers (§3.1).

pub struct ByteBuf {
    bytes: Vec<u8>,
}

impl ByteBuf {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u16_be(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32_be(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for ByteBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a little-endian `u16` at `offset`, bounds-checked.
pub fn read_u16_le(data: &[u8], offset: usize) -> crate::error::Result<u16> {
    crate::error::safety_check!(offset + 2 <= data.len(), crate::error::Error::TruncatedInput);
    Ok(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

/// Read a little-endian `u32` at `offset`, bounds-checked.
pub fn read_u32_le(data: &[u8], offset: usize) -> crate::error::Result<u32> {
    crate::error::safety_check!(offset + 4 <= data.len(), crate::error::Error::TruncatedInput);
    Ok(u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_little_endian_integers() {
        let mut buf = ByteBuf::new();
        buf.write_u16_le(0x1234);
        buf.write_u32_le(0xDEADBEEF);
        let bytes = buf.into_vec();
        assert_eq!(read_u16_le(&bytes, 0).unwrap(), 0x1234);
        assert_eq!(read_u32_le(&bytes, 2).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn read_past_end_is_truncated_input() {
        let bytes = [0u8; 1];
        assert!(read_u16_le(&bytes, 0).is_err());
    }
}
