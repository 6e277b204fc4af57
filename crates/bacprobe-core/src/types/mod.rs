pub mod error_class;
pub mod object_id;
pub mod object_type;
pub mod property_id;
pub mod property_value;

use core::fmt;

pub use error_class::{ErrorClass, ErrorCode};
pub use object_id::ObjectId;
pub use object_type::ObjectType;
pub use property_id::PropertyId;
pub use property_value::PropertyValue;

/// Failure to parse an identifier from its text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    UnknownObjectType(String),
    UnknownProperty(String),
    MissingInstance(String),
    InvalidInstance(String),
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownObjectType(s) => write!(f, "unknown object type '{s}'"),
            Self::UnknownProperty(s) => write!(f, "unknown property '{s}'"),
            Self::MissingInstance(s) => write!(f, "expected 'type,instance', got '{s}'"),
            Self::InvalidInstance(s) => write!(f, "invalid object instance '{s}'"),
        }
    }
}

impl std::error::Error for ParseIdError {}

/// Lowercases and strips `-`, `_` and spaces so name spellings compare equal.
pub(crate) fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
