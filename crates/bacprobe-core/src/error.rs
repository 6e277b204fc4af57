use core::fmt;

/// Failure to represent caller-supplied data in the request layout.
///
/// Encoding never truncates: any field that does not fit its fixed width is
/// reported here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall,
    ValueOutOfRange,
    /// Character strings carry a single length byte.
    StringTooLong { len: usize },
    InvalidPriority(u8),
    InstanceOutOfRange(u32),
    InvalidWhoIsRange { low: u32, high: u32 },
    Message(&'static str),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::StringTooLong { len } => {
                write!(f, "character string of {len} bytes exceeds 255")
            }
            Self::InvalidPriority(p) => write!(f, "write priority {p} outside 1..=16"),
            Self::InstanceOutOfRange(i) => write!(f, "object instance {i} exceeds 4194303"),
            Self::InvalidWhoIsRange { low, high } => {
                write!(f, "invalid who-is range {low}..={high}")
            }
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    Unsupported,
    Message(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::InvalidTag => f.write_str("invalid tag"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::Unsupported => f.write_str("operation unsupported"),
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DecodeError {}
