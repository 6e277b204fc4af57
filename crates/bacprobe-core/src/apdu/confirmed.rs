use crate::apdu::ApduType;
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

const SEGMENTED_FLAG: u8 = 0b0000_1000;
const ABORT_SERVER_FLAG: u8 = 0b0000_0001;

/// Header of an outgoing confirmed request: type byte, service choice, then
/// the invoke id a compliant responder echoes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRequestHeader {
    pub service_choice: u8,
    pub invoke_id: u8,
}

impl ConfirmedRequestHeader {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8((ApduType::ConfirmedRequest as u8) << 4)?;
        w.write_u8(self.service_choice)?;
        w.write_u8(self.invoke_id)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::ConfirmedRequest as u8 {
            return Err(DecodeError::InvalidValue);
        }
        let service_choice = r.read_u8()?;
        let invoke_id = r.read_u8()?;
        Ok(Self {
            service_choice,
            invoke_id,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexAckHeader {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ComplexAckHeader {
    pub const LEN: usize = 3;

    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8((ApduType::ComplexAck as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    /// Segmented acknowledgements are reported as [`DecodeError::Unsupported`].
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::ComplexAck as u8 {
            return Err(DecodeError::InvalidValue);
        }
        if (b0 & SEGMENTED_FLAG) != 0 {
            return Err(DecodeError::Unsupported);
        }
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAck {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl SimpleAck {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8((ApduType::SimpleAck as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::SimpleAck as u8 {
            return Err(DecodeError::InvalidValue);
        }
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

/// Error PDU. Class and code are enumerated values; either may be absent in
/// truncated responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacnetError {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub error_class: Option<u32>,
    pub error_code: Option<u32>,
}

impl BacnetError {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8((ApduType::Error as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)?;
        for value in [self.error_class, self.error_code].into_iter().flatten() {
            encode_enumerated(w, value)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::Error as u8 {
            return Err(DecodeError::InvalidValue);
        }
        let invoke_id = r.read_u8()?;
        let service_choice = r.read_u8()?;
        let error_class = decode_enumerated(r)?;
        let error_code = if error_class.is_some() {
            decode_enumerated(r)?
        } else {
            None
        };
        Ok(Self {
            invoke_id,
            service_choice,
            error_class,
            error_code,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectPdu {
    pub invoke_id: u8,
    pub reason: u8,
}

impl RejectPdu {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8((ApduType::Reject as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.reason)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::Reject as u8 {
            return Err(DecodeError::InvalidValue);
        }
        Ok(Self {
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPdu {
    pub server: bool,
    pub invoke_id: u8,
    pub reason: u8,
}

impl AbortPdu {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        let mut b0 = (ApduType::Abort as u8) << 4;
        if self.server {
            b0 |= ABORT_SERVER_FLAG;
        }
        w.write_u8(b0)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.reason)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if (b0 >> 4) != ApduType::Abort as u8 {
            return Err(DecodeError::InvalidValue);
        }
        Ok(Self {
            server: (b0 & ABORT_SERVER_FLAG) != 0,
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

// Application tag 9 (enumerated) with a 1-4 byte length in the low bits.
fn encode_enumerated(w: &mut Writer, value: u32) -> Result<(), EncodeError> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take(3).take_while(|b| **b == 0).count();
    w.write_u8(0x90 | (4 - skip) as u8)?;
    w.write_all(&bytes[skip..])
}

fn decode_enumerated(r: &mut Reader<'_>) -> Result<Option<u32>, DecodeError> {
    if r.is_empty() {
        return Ok(None);
    }
    let tag = r.read_u8()?;
    if (tag & 0xF8) != 0x90 {
        return Err(DecodeError::InvalidTag);
    }
    let len = usize::from(tag & 0x07);
    if !(1..=4).contains(&len) {
        return Err(DecodeError::InvalidLength);
    }
    let value = r
        .read_exact(len)?
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::{AbortPdu, BacnetError, ComplexAckHeader, ConfirmedRequestHeader, SimpleAck};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;

    #[test]
    fn confirmed_header_puts_service_before_invoke_id() {
        let mut w = Writer::new();
        ConfirmedRequestHeader {
            service_choice: 0x0C,
            invoke_id: 9,
        }
        .encode(&mut w)
        .unwrap();
        assert_eq!(w.as_written(), &[0x00, 0x0C, 0x09]);
    }

    #[test]
    fn error_pdu_decodes_class_and_code() {
        let mut r = Reader::new(&[0x50, 0x04, 0x0F, 0x91, 0x02, 0x91, 0x28]);
        let err = BacnetError::decode(&mut r).unwrap();
        assert_eq!(err.invoke_id, 4);
        assert_eq!(err.service_choice, 0x0F);
        assert_eq!(err.error_class, Some(2));
        assert_eq!(err.error_code, Some(40));
    }

    #[test]
    fn error_pdu_encodes_wide_codes() {
        let mut w = Writer::new();
        BacnetError {
            invoke_id: 1,
            service_choice: 0x0C,
            error_class: Some(1),
            error_code: Some(300),
        }
        .encode(&mut w)
        .unwrap();
        assert_eq!(w.as_written(), &[0x50, 0x01, 0x0C, 0x91, 0x01, 0x92, 0x01, 0x2C]);
        let mut r = Reader::new(w.as_written());
        assert_eq!(BacnetError::decode(&mut r).unwrap().error_code, Some(300));
    }

    #[test]
    fn truncated_error_pdu_has_no_class() {
        let mut r = Reader::new(&[0x50, 0x04, 0x0F]);
        let err = BacnetError::decode(&mut r).unwrap();
        assert_eq!(err.error_class, None);
        assert_eq!(err.error_code, None);
    }

    #[test]
    fn segmented_complex_ack_is_unsupported() {
        let mut r = Reader::new(&[0x38, 0x01, 0x0C, 0x00, 0x01]);
        assert_eq!(
            ComplexAckHeader::decode(&mut r).unwrap_err(),
            DecodeError::Unsupported
        );
    }

    #[test]
    fn ack_and_abort_headers() {
        let mut r = Reader::new(&[0x20, 0x07, 0x0F]);
        assert_eq!(
            SimpleAck::decode(&mut r).unwrap(),
            SimpleAck {
                invoke_id: 7,
                service_choice: 0x0F
            }
        );
        let mut r = Reader::new(&[0x71, 0x03, 0x04]);
        let abort = AbortPdu::decode(&mut r).unwrap();
        assert!(abort.server);
        assert_eq!((abort.invoke_id, abort.reason), (3, 4));
    }
}
