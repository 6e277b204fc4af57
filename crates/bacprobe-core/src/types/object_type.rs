use crate::types::{normalize_name, ParseIdError};
use core::fmt;
use core::str::FromStr;

/// BACnet object types.
///
/// Known standard types are represented as named variants; proprietary
/// vendor-specific types use the [`Proprietary`](Self::Proprietary) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Calendar,
    Command,
    Device,
    EventEnrollment,
    File,
    Group,
    Loop,
    MultiStateInput,
    MultiStateOutput,
    NotificationClass,
    Program,
    Schedule,
    Averaging,
    MultiStateValue,
    TrendLog,
    LifeSafetyPoint,
    LifeSafetyZone,
    Accumulator,
    PulseConverter,
    EventLog,
    GlobalGroup,
    TrendLogMultiple,
    LoadControl,
    StructuredView,
    AccessDoor,
    Proprietary(u16),
}

impl ObjectType {
    /// Every named standard type, in numeric order.
    pub const STANDARD: [ObjectType; 31] = [
        Self::AnalogInput,
        Self::AnalogOutput,
        Self::AnalogValue,
        Self::BinaryInput,
        Self::BinaryOutput,
        Self::BinaryValue,
        Self::Calendar,
        Self::Command,
        Self::Device,
        Self::EventEnrollment,
        Self::File,
        Self::Group,
        Self::Loop,
        Self::MultiStateInput,
        Self::MultiStateOutput,
        Self::NotificationClass,
        Self::Program,
        Self::Schedule,
        Self::Averaging,
        Self::MultiStateValue,
        Self::TrendLog,
        Self::LifeSafetyPoint,
        Self::LifeSafetyZone,
        Self::Accumulator,
        Self::PulseConverter,
        Self::EventLog,
        Self::GlobalGroup,
        Self::TrendLogMultiple,
        Self::LoadControl,
        Self::StructuredView,
        Self::AccessDoor,
    ];

    /// Converts this object type to its numeric BACnet identifier.
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::AnalogInput => 0,
            Self::AnalogOutput => 1,
            Self::AnalogValue => 2,
            Self::BinaryInput => 3,
            Self::BinaryOutput => 4,
            Self::BinaryValue => 5,
            Self::Calendar => 6,
            Self::Command => 7,
            Self::Device => 8,
            Self::EventEnrollment => 9,
            Self::File => 10,
            Self::Group => 11,
            Self::Loop => 12,
            Self::MultiStateInput => 13,
            Self::MultiStateOutput => 14,
            Self::NotificationClass => 15,
            Self::Program => 16,
            Self::Schedule => 17,
            Self::Averaging => 18,
            Self::MultiStateValue => 19,
            Self::TrendLog => 20,
            Self::LifeSafetyPoint => 21,
            Self::LifeSafetyZone => 22,
            Self::Accumulator => 23,
            Self::PulseConverter => 24,
            Self::EventLog => 25,
            Self::GlobalGroup => 26,
            Self::TrendLogMultiple => 27,
            Self::LoadControl => 28,
            Self::StructuredView => 29,
            Self::AccessDoor => 30,
            Self::Proprietary(v) => v,
        }
    }

    /// Creates an `ObjectType` from its numeric BACnet identifier.
    ///
    /// Values without a known standard mapping become [`Proprietary`](Self::Proprietary).
    pub const fn from_u16(value: u16) -> Self {
        if (value as usize) < Self::STANDARD.len() {
            Self::STANDARD[value as usize]
        } else {
            Self::Proprietary(value)
        }
    }

    /// The camelCase name used on the command line, `None` for proprietary types.
    pub const fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::AnalogInput => "analogInput",
            Self::AnalogOutput => "analogOutput",
            Self::AnalogValue => "analogValue",
            Self::BinaryInput => "binaryInput",
            Self::BinaryOutput => "binaryOutput",
            Self::BinaryValue => "binaryValue",
            Self::Calendar => "calendar",
            Self::Command => "command",
            Self::Device => "device",
            Self::EventEnrollment => "eventEnrollment",
            Self::File => "file",
            Self::Group => "group",
            Self::Loop => "loop",
            Self::MultiStateInput => "multiStateInput",
            Self::MultiStateOutput => "multiStateOutput",
            Self::NotificationClass => "notificationClass",
            Self::Program => "program",
            Self::Schedule => "schedule",
            Self::Averaging => "averaging",
            Self::MultiStateValue => "multiStateValue",
            Self::TrendLog => "trendLog",
            Self::LifeSafetyPoint => "lifeSafetyPoint",
            Self::LifeSafetyZone => "lifeSafetyZone",
            Self::Accumulator => "accumulator",
            Self::PulseConverter => "pulseConverter",
            Self::EventLog => "eventLog",
            Self::GlobalGroup => "globalGroup",
            Self::TrendLogMultiple => "trendLogMultiple",
            Self::LoadControl => "loadControl",
            Self::StructuredView => "structuredView",
            Self::AccessDoor => "accessDoor",
            Self::Proprietary(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.to_u16()),
        }
    }
}

impl FromStr for ObjectType {
    type Err = ParseIdError;

    /// Accepts `analogInput`, `analog-input`, `ANALOG_INPUT`, or a numeric type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(raw) = s.parse::<u16>() {
            if raw > 0x03FF {
                return Err(ParseIdError::UnknownObjectType(s.to_string()));
            }
            return Ok(Self::from_u16(raw));
        }
        let wanted = normalize_name(s);
        Self::STANDARD
            .iter()
            .copied()
            .find(|t| t.name().is_some_and(|n| n.eq_ignore_ascii_case(&wanted)))
            .ok_or_else(|| ParseIdError::UnknownObjectType(s.to_string()))
    }
}
