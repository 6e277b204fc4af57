use core::fmt;

/// A property value recovered from a response, or supplied for a write.
///
/// [`Unparsed`](Self::Unparsed) is the explicit result of a scan that found no
/// recognised value tag; it keeps at most [`PropertyValue::PREVIEW_LEN`] bytes
/// of the response for display and is never coerced into another variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Boolean(bool),
    UnsignedInteger(u32),
    Real(f32),
    CharacterString(String),
    Null,
    Unparsed(Vec<u8>),
}

impl PropertyValue {
    /// Number of raw bytes retained by [`Self::unparsed`].
    pub const PREVIEW_LEN: usize = 10;

    /// Builds the fallback variant from the head of `bytes`.
    pub fn unparsed(bytes: &[u8]) -> Self {
        Self::Unparsed(bytes[..bytes.len().min(Self::PREVIEW_LEN)].to_vec())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::CharacterString(s) => Some(s),
            _ => None,
        }
    }

    pub const fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed(_))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::UnsignedInteger(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::CharacterString(v) => f.write_str(v),
            Self::Null => f.write_str("null"),
            Self::Unparsed(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                f.write_str("...")
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::UnsignedInteger(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::CharacterString(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::CharacterString(value)
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyValue;

    #[test]
    fn unparsed_preview_is_capped() {
        let v = PropertyValue::unparsed(&[0xAB; 32]);
        assert_eq!(v, PropertyValue::Unparsed(vec![0xAB; 10]));
        assert_eq!(v.to_string(), "0xabababababababababab...");
    }

    #[test]
    fn displays_plain_values() {
        assert_eq!(PropertyValue::from(true).to_string(), "true");
        assert_eq!(PropertyValue::from(42u32).to_string(), "42");
        assert_eq!(PropertyValue::from(21.5f32).to_string(), "21.5");
        assert_eq!(PropertyValue::from("AHU-1").to_string(), "AHU-1");
        assert_eq!(PropertyValue::Null.to_string(), "null");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_string(&PropertyValue::UnsignedInteger(7)).unwrap();
        assert_eq!(json, r#"{"UnsignedInteger":7}"#);
    }
}
