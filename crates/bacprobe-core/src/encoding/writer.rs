use crate::EncodeError;

/// Appends encoded fields to an owned buffer, optionally bounded.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::with_capacity(limit.min(1500)),
            limit: Some(limit),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError> {
        self.write_all(&[value])
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        if let Some(limit) = self.limit {
            if self.buf.len() + data.len() > limit {
                return Err(EncodeError::BufferTooSmall);
            }
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn write_be_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_be_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_be_f32(&mut self, value: f32) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }
}
