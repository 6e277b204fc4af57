//! Tag bytes of the request layout.
//!
//! Identifier fields are written as `tag length value`; data values use a
//! single type byte followed by their payload.

/// Object identifier field, followed by length 4.
pub const OBJECT_ID: u8 = 0x00;
/// Property identifier field, followed by length 2.
pub const PROPERTY_ID: u8 = 0x01;
/// Array index field, followed by length 2.
pub const ARRAY_INDEX: u8 = 0x02;
/// Write priority, followed by one priority byte.
pub const PRIORITY: u8 = 0x87;

pub const OBJECT_ID_LEN: u8 = 4;
pub const PROPERTY_ID_LEN: u8 = 2;
pub const ARRAY_INDEX_LEN: u8 = 2;

pub const NULL: u8 = 0x00;
/// Boolean and small enumerations (reinitialize kind, COV confirmation).
pub const BOOLEAN: u8 = 0x91;
/// Unsigned integer, followed by a length marker and 4 value bytes.
pub const UNSIGNED: u8 = 0x21;
pub const UNSIGNED_MARKER: u8 = 0x02;
pub const REAL: u8 = 0x44;
pub const CHARACTER_STRING: u8 = 0x75;

/// Who-Is low limit, followed by 4 bytes.
pub const WHO_IS_LOW: u8 = 0x0C;
/// Who-Is high limit, followed by 4 bytes.
pub const WHO_IS_HIGH: u8 = 0x1C;

/// Application-tagged object identifier as carried by I-Am.
pub const APP_OBJECT_ID: u8 = 0xC4;
/// Context tag 0, length 4: the standard context-tagged object identifier.
pub const CONTEXT_OBJECT_ID: u8 = 0x0C;
