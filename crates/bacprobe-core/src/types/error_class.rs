/// BACnet error class reported in Error PDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorClass {
    Device = 0,
    Object = 1,
    Property = 2,
    Resources = 3,
    Security = 4,
    Services = 5,
    Vt = 6,
    Communication = 7,
}

/// BACnet error code reported in Error PDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ErrorCode {
    Other = 0,
    ConfigurationInProgress = 2,
    DeviceBusy = 3,
    InconsistentParameters = 7,
    InvalidDataType = 9,
    MissingRequiredParameter = 16,
    NoSpaceForObject = 18,
    ObjectDeletionNotPermitted = 23,
    ObjectIdentifierAlreadyExists = 24,
    PasswordFailure = 26,
    ServiceRequestDenied = 29,
    UnknownObject = 31,
    UnknownProperty = 32,
    UnsupportedObjectType = 36,
    ValueOutOfRange = 37,
    WriteAccessDenied = 40,
}

impl ErrorClass {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Device),
            1 => Some(Self::Object),
            2 => Some(Self::Property),
            3 => Some(Self::Resources),
            4 => Some(Self::Security),
            5 => Some(Self::Services),
            6 => Some(Self::Vt),
            7 => Some(Self::Communication),
            _ => None,
        }
    }
}

impl ErrorCode {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Other),
            2 => Some(Self::ConfigurationInProgress),
            3 => Some(Self::DeviceBusy),
            7 => Some(Self::InconsistentParameters),
            9 => Some(Self::InvalidDataType),
            16 => Some(Self::MissingRequiredParameter),
            18 => Some(Self::NoSpaceForObject),
            23 => Some(Self::ObjectDeletionNotPermitted),
            24 => Some(Self::ObjectIdentifierAlreadyExists),
            26 => Some(Self::PasswordFailure),
            29 => Some(Self::ServiceRequestDenied),
            31 => Some(Self::UnknownObject),
            32 => Some(Self::UnknownProperty),
            36 => Some(Self::UnsupportedObjectType),
            37 => Some(Self::ValueOutOfRange),
            40 => Some(Self::WriteAccessDenied),
            _ => None,
        }
    }
}
