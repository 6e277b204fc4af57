use crate::types::{ObjectType, ParseIdError};
use crate::EncodeError;
use core::fmt;
use core::str::FromStr;

/// A BACnet object identifier: an [`ObjectType`] plus a 22-bit instance.
///
/// On the wire the upper 10 bits of a `u32` carry the type and the lower 22
/// bits the instance. The instance is validated on construction, so every
/// `ObjectId` packs without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId {
    object_type: ObjectType,
    instance: u32,
}

impl ObjectId {
    /// Largest encodable instance number (2^22 - 1).
    pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

    /// Creates an `ObjectId`, rejecting instances above [`Self::MAX_INSTANCE`].
    pub const fn new(object_type: ObjectType, instance: u32) -> Result<Self, EncodeError> {
        if instance > Self::MAX_INSTANCE {
            return Err(EncodeError::InstanceOutOfRange(instance));
        }
        Ok(Self {
            object_type,
            instance,
        })
    }

    /// Returns the packed `u32` representation.
    pub const fn raw(self) -> u32 {
        (((self.object_type.to_u16() as u32) & 0x03FF) << 22) | self.instance
    }

    /// Unpacks a wire `u32`. Every value is a valid identifier.
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            object_type: ObjectType::from_u16(((raw >> 22) & 0x03FF) as u16),
            instance: raw & Self::MAX_INSTANCE,
        }
    }

    pub const fn object_type(self) -> ObjectType {
        self.object_type
    }

    pub const fn instance(self) -> u32 {
        self.instance
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.object_type, self.instance)
    }
}

impl FromStr for ObjectId {
    type Err = ParseIdError;

    /// Parses the `type,instance` form, e.g. `analogInput,1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (object_type, instance) = s
            .split_once(',')
            .ok_or_else(|| ParseIdError::MissingInstance(s.to_string()))?;
        let object_type = object_type.parse::<ObjectType>()?;
        let instance = instance
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseIdError::InvalidInstance(instance.trim().to_string()))?;
        Self::new(object_type, instance)
            .map_err(|_| ParseIdError::InvalidInstance(instance.to_string()))
    }
}
