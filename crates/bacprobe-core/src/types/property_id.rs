use crate::types::{normalize_name, ParseIdError};
use core::fmt;
use core::str::FromStr;

macro_rules! property_ids {
    ($($variant:ident = $code:literal, $name:literal;)+) => {
        /// BACnet property identifiers.
        ///
        /// Common standard properties are named variants; vendor-specific or
        /// unrecognised identifiers use [`Proprietary`](Self::Proprietary).
        /// Property codes share their numeric space with service choices, so a
        /// bare code is only meaningful next to the field it came from.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum PropertyId {
            $($variant,)+
            Proprietary(u32),
        }

        impl PropertyId {
            /// Every named property.
            pub const KNOWN: &'static [PropertyId] = &[$(Self::$variant,)+];

            pub const fn to_u32(self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Proprietary(v) => v,
                }
            }

            pub const fn from_u32(value: u32) -> Self {
                match value {
                    $($code => Self::$variant,)+
                    v => Self::Proprietary(v),
                }
            }

            /// The camelCase name, `None` for proprietary identifiers.
            pub const fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($name),)+
                    Self::Proprietary(_) => None,
                }
            }
        }
    };
}

property_ids! {
    AckedTransitions = 0, "ackedTransitions";
    AlarmValue = 6, "alarmValue";
    ApplicationSoftwareVersion = 12, "applicationSoftwareVersion";
    NotificationClass = 17, "notificationClass";
    CovIncrement = 22, "covIncrement";
    Description = 28, "description";
    EventEnable = 35, "eventEnable";
    EventState = 36, "eventState";
    EventType = 37, "eventType";
    FirmwareRevision = 44, "firmwareRevision";
    Location = 58, "location";
    MaxApduLengthAccepted = 62, "maxApduLengthAccepted";
    MinimumOffTime = 66, "minimumOffTime";
    MinimumOnTime = 67, "minimumOnTime";
    ModelName = 70, "modelName";
    NotifyType = 72, "notifyType";
    ObjectIdentifier = 75, "objectIdentifier";
    ObjectList = 76, "objectList";
    ObjectName = 77, "objectName";
    ObjectType = 79, "objectType";
    OutOfService = 81, "outOfService";
    EventParameters = 83, "eventParameters";
    PresentValue = 85, "presentValue";
    PriorityArray = 87, "priorityArray";
    ProtocolVersion = 98, "protocolVersion";
    Reliability = 103, "reliability";
    RelinquishDefault = 104, "relinquishDefault";
    SegmentationSupported = 107, "segmentationSupported";
    StatusFlags = 111, "statusFlags";
    SystemStatus = 112, "systemStatus";
    TimeDelay = 113, "timeDelay";
    Units = 117, "units";
    VendorIdentifier = 120, "vendorIdentifier";
    VendorName = 121, "vendorName";
    EventTimeStamps = 130, "eventTimeStamps";
    ProtocolRevision = 139, "protocolRevision";
    EventMessageTexts = 351, "eventMessageTexts";
    EventMessageTextsConfig = 352, "eventMessageTextsConfig";
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.to_u32()),
        }
    }
}

impl FromStr for PropertyId {
    type Err = ParseIdError;

    /// Accepts `presentValue`, `present-value`, `PRESENT_VALUE`, or a decimal code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Ok(Self::from_u32(code));
        }
        let wanted = normalize_name(s);
        Self::KNOWN
            .iter()
            .copied()
            .find(|p| p.name().is_some_and(|n| n.eq_ignore_ascii_case(&wanted)))
            .ok_or_else(|| ParseIdError::UnknownProperty(s.to_string()))
    }
}
