use bacprobe_core::encoding::{reader::Reader, writer::Writer};
use bacprobe_core::{DecodeError, EncodeError};

pub const BVLC_TYPE_BIP: u8 = 0x81;
pub const BVLC_HEADER_LEN: usize = 4;

/// BVLC functions a client sees on the wire. BBMD table management
/// functions decode as [`Unknown`](Self::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvlcFunction {
    Result,
    ForwardedNpdu,
    DistributeBroadcastToNetwork,
    OriginalUnicastNpdu,
    OriginalBroadcastNpdu,
    Unknown(u8),
}

impl BvlcFunction {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Result,
            0x04 => Self::ForwardedNpdu,
            0x09 => Self::DistributeBroadcastToNetwork,
            0x0A => Self::OriginalUnicastNpdu,
            0x0B => Self::OriginalBroadcastNpdu,
            v => Self::Unknown(v),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Result => 0x00,
            Self::ForwardedNpdu => 0x04,
            Self::DistributeBroadcastToNetwork => 0x09,
            Self::OriginalUnicastNpdu => 0x0A,
            Self::OriginalBroadcastNpdu => 0x0B,
            Self::Unknown(v) => v,
        }
    }

    /// Functions whose payload is an NPDU.
    pub const fn carries_npdu(self) -> bool {
        matches!(
            self,
            Self::ForwardedNpdu
                | Self::DistributeBroadcastToNetwork
                | Self::OriginalUnicastNpdu
                | Self::OriginalBroadcastNpdu
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvlcHeader {
    pub function: BvlcFunction,
    /// Total packet length, header included.
    pub length: u16,
}

impl BvlcHeader {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8(BVLC_TYPE_BIP)?;
        w.write_u8(self.function.to_u8())?;
        w.write_be_u16(self.length)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != BVLC_TYPE_BIP {
            return Err(DecodeError::InvalidValue);
        }
        let function = BvlcFunction::from_u8(r.read_u8()?);
        let length = r.read_be_u16()?;
        if usize::from(length) < BVLC_HEADER_LEN {
            return Err(DecodeError::InvalidLength);
        }
        Ok(Self { function, length })
    }
}
