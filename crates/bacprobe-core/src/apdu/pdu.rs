/// PDU type carried in the high nibble of the first APDU byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl ApduType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ConfirmedRequest),
            1 => Some(Self::UnconfirmedRequest),
            2 => Some(Self::SimpleAck),
            3 => Some(Self::ComplexAck),
            4 => Some(Self::SegmentAck),
            5 => Some(Self::Error),
            6 => Some(Self::Reject),
            7 => Some(Self::Abort),
            _ => None,
        }
    }

    /// Classifies an APDU by its first byte.
    pub fn of(apdu: &[u8]) -> Option<Self> {
        apdu.first().and_then(|b| Self::from_u8(b >> 4))
    }

    /// Responses that answer a confirmed request and carry its invoke id.
    pub const fn is_response(self) -> bool {
        matches!(
            self,
            Self::SimpleAck | Self::ComplexAck | Self::Error | Self::Reject | Self::Abort
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ApduType;

    #[test]
    fn classifies_by_high_nibble() {
        assert_eq!(ApduType::of(&[0x10, 0x00]), Some(ApduType::UnconfirmedRequest));
        assert_eq!(ApduType::of(&[0x3C]), Some(ApduType::ComplexAck));
        assert_eq!(ApduType::of(&[0x71]), Some(ApduType::Abort));
        assert_eq!(ApduType::of(&[0x80]), None);
        assert_eq!(ApduType::of(&[]), None);
        assert!(ApduType::Reject.is_response());
        assert!(!ApduType::SegmentAck.is_response());
    }
}
