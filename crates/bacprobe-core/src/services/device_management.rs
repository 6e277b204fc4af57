use core::fmt;
use core::str::FromStr;

pub const SERVICE_DEVICE_COMMUNICATION_CONTROL: u8 = 0x11;
pub const SERVICE_REINITIALIZE_DEVICE: u8 = 0x14;

/// Command strings carried by DeviceCommunicationControl requests.
pub mod command {
    pub const RESET: &str = "reset";
    pub const BACKUP: &str = "backup";
    pub const RESTORE: &str = "restore";
    pub const UPDATE_FIRMWARE: &str = "update_firmware";
    pub const SET_TIME: &str = "set_time";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ReinitializeKind {
    Coldstart = 0,
    Warmstart = 1,
    StartBackup = 2,
    EndBackup = 3,
    StartRestore = 4,
    EndRestore = 5,
    AbortRestore = 6,
    ActivateChanges = 7,
}

impl ReinitializeKind {
    pub const ALL: [Self; 8] = [
        Self::Coldstart,
        Self::Warmstart,
        Self::StartBackup,
        Self::EndBackup,
        Self::StartRestore,
        Self::EndRestore,
        Self::AbortRestore,
        Self::ActivateChanges,
    ];

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Coldstart => "coldstart",
            Self::Warmstart => "warmstart",
            Self::StartBackup => "startbackup",
            Self::EndBackup => "endbackup",
            Self::StartRestore => "startrestore",
            Self::EndRestore => "endrestore",
            Self::AbortRestore => "abortrestore",
            Self::ActivateChanges => "activatechanges",
        }
    }
}

impl fmt::Display for ReinitializeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReinitializeKind(pub String);

impl fmt::Display for UnknownReinitializeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reinitialize kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownReinitializeKind {}

impl FromStr for ReinitializeKind {
    type Err = UnknownReinitializeKind;

    /// Accepts `coldstart`, `warm-start`, `Start_Backup` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = crate::types::normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownReinitializeKind(s.to_string()))
    }
}
