//! Property value encoding and the response value scanner.
//!
//! Outbound values are written with a single type byte followed by their
//! payload. Inbound values are recovered by [`decode_value`], a heuristic
//! scanner: it looks for the first recognisable value tag instead of walking
//! the APDU as tag-length-value data. Responses in the supported service
//! subset carry at most one value, which is what makes this adequate.

use crate::encoding::{reader::Reader, tag, writer::Writer};
use crate::types::{ObjectId, PropertyValue};
use crate::{DecodeError, EncodeError};

/// Upper bound on the number of bytes [`decode_value`] inspects.
pub const MAX_SCAN_WINDOW: usize = 1476;

pub fn encode_value(w: &mut Writer, value: &PropertyValue) -> Result<(), EncodeError> {
    match value {
        PropertyValue::Boolean(v) => {
            w.write_u8(tag::BOOLEAN)?;
            w.write_u8(u8::from(*v))
        }
        PropertyValue::UnsignedInteger(v) => {
            w.write_u8(tag::UNSIGNED)?;
            w.write_u8(tag::UNSIGNED_MARKER)?;
            w.write_be_u32(*v)
        }
        PropertyValue::Real(v) => {
            w.write_u8(tag::REAL)?;
            w.write_be_f32(*v)
        }
        PropertyValue::CharacterString(s) => encode_character_string(w, s),
        PropertyValue::Null | PropertyValue::Unparsed(_) => w.write_u8(tag::NULL),
    }
}

pub fn encode_character_string(w: &mut Writer, s: &str) -> Result<(), EncodeError> {
    let len = u8::try_from(s.len()).map_err(|_| EncodeError::StringTooLong { len: s.len() })?;
    w.write_u8(tag::CHARACTER_STRING)?;
    w.write_u8(len)?;
    w.write_all(s.as_bytes())
}

/// Reads one value written by [`encode_value`] at the reader's position.
pub fn read_value(r: &mut Reader<'_>) -> Result<PropertyValue, DecodeError> {
    match r.read_u8()? {
        tag::BOOLEAN => match r.read_u8()? {
            0 => Ok(PropertyValue::Boolean(false)),
            1 => Ok(PropertyValue::Boolean(true)),
            _ => Err(DecodeError::InvalidValue),
        },
        tag::UNSIGNED => {
            r.expect_u8(tag::UNSIGNED_MARKER)?;
            Ok(PropertyValue::UnsignedInteger(r.read_be_u32()?))
        }
        tag::REAL => Ok(PropertyValue::Real(r.read_be_f32()?)),
        tag::CHARACTER_STRING => read_character_string(r).map(PropertyValue::CharacterString),
        tag::NULL => Ok(PropertyValue::Null),
        _ => Err(DecodeError::InvalidTag),
    }
}

pub fn read_character_string(r: &mut Reader<'_>) -> Result<String, DecodeError> {
    let len = r.read_u8()?;
    let bytes = r.read_exact(usize::from(len))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidValue)
}

/// Scans `bytes` for the first recognisable value.
///
/// Precedence, each rule applied over the whole window before the next:
///
/// 1. character string (`0x75`, length byte, payload) whose payload is complete;
/// 2. unsigned integer (`0x21`, length marker, 4 bytes);
/// 3. real (`0x44`, 4 bytes, IEEE-754 single precision).
///
/// When nothing matches the result is [`PropertyValue::Unparsed`] holding a
/// short preview of the input. Only the first [`MAX_SCAN_WINDOW`] bytes are
/// considered.
pub fn decode_value(bytes: &[u8]) -> PropertyValue {
    let window = &bytes[..bytes.len().min(MAX_SCAN_WINDOW)];
    scan_character_string(window)
        .or_else(|| scan_unsigned(window))
        .or_else(|| scan_real(window))
        .unwrap_or_else(|| PropertyValue::unparsed(window))
}

fn scan_character_string(window: &[u8]) -> Option<PropertyValue> {
    window.iter().enumerate().find_map(|(i, b)| {
        if *b != tag::CHARACTER_STRING {
            return None;
        }
        let len = usize::from(*window.get(i + 1)?);
        let payload = window.get(i + 2..i + 2 + len)?;
        Some(PropertyValue::CharacterString(
            String::from_utf8_lossy(payload).into_owned(),
        ))
    })
}

fn scan_unsigned(window: &[u8]) -> Option<PropertyValue> {
    window.iter().enumerate().find_map(|(i, b)| {
        if *b != tag::UNSIGNED {
            return None;
        }
        let v = window.get(i + 2..i + 6)?;
        Some(PropertyValue::UnsignedInteger(u32::from_be_bytes([
            v[0], v[1], v[2], v[3],
        ])))
    })
}

fn scan_real(window: &[u8]) -> Option<PropertyValue> {
    window.iter().enumerate().find_map(|(i, b)| {
        if *b != tag::REAL {
            return None;
        }
        let v = window.get(i + 1..i + 5)?;
        Some(PropertyValue::Real(f32::from_be_bytes([v[0], v[1], v[2], v[3]])))
    })
}

pub fn encode_object_id(w: &mut Writer, id: ObjectId) -> Result<(), EncodeError> {
    w.write_u8(tag::OBJECT_ID)?;
    w.write_u8(tag::OBJECT_ID_LEN)?;
    w.write_be_u32(id.raw())
}

pub fn read_object_id(r: &mut Reader<'_>) -> Result<ObjectId, DecodeError> {
    r.expect_u8(tag::OBJECT_ID)?;
    if r.read_u8()? != tag::OBJECT_ID_LEN {
        return Err(DecodeError::InvalidLength);
    }
    Ok(ObjectId::from_raw(r.read_be_u32()?))
}

/// Decodes a standard tagged object identifier at the start of `bytes`.
///
/// Both the application-tagged form (`0xC4`, as in I-Am) and the context
/// tag 0 form (`0x0C`) are accepted. Returns `None` when neither is present
/// or the payload is truncated.
pub fn decode_object_id(bytes: &[u8]) -> Option<ObjectId> {
    match bytes {
        [tag::APP_OBJECT_ID | tag::CONTEXT_OBJECT_ID, a, b, c, d, ..] => {
            Some(ObjectId::from_raw(u32::from_be_bytes([*a, *b, *c, *d])))
        }
        _ => None,
    }
}
