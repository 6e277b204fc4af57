use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet network layer protocol version (always `0x01`).
pub const NPDU_VERSION: u8 = 0x01;

const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
const CONTROL_DESTINATION: u8 = 0x20;
const CONTROL_SOURCE: u8 = 0x08;

/// Network number plus MAC address of a routed NPDU endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpduAddress {
    pub network: u16,
    pub mac: [u8; 8],
    pub mac_len: u8,
}

/// NPDU header.
///
/// The client only ever emits the two-byte local form (`0x01 0x00`). Inbound
/// headers from routers may carry destination/source specifiers and a hop
/// count, which decoding skips over so the APDU can be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npdu {
    pub control: u8,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: Option<u8>,
}

impl Npdu {
    /// Local delivery, no routing information, no reply expectation bits.
    pub const LOCAL: Self = Self {
        control: 0x00,
        destination: None,
        source: None,
        hop_count: None,
    };

    pub const fn is_network_message(&self) -> bool {
        (self.control & CONTROL_NETWORK_MESSAGE) != 0
    }

    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8(NPDU_VERSION)?;
        w.write_u8(self.control)?;
        if let Some(dest) = self.destination {
            encode_addr(w, dest)?;
        }
        if let Some(src) = self.source {
            encode_addr(w, src)?;
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count.unwrap_or(255))?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }
        let control = r.read_u8()?;
        let destination = if (control & CONTROL_DESTINATION) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let source = if (control & CONTROL_SOURCE) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let hop_count = if destination.is_some() {
            Some(r.read_u8()?)
        } else {
            None
        };
        Ok(Self {
            control,
            destination,
            source,
            hop_count,
        })
    }
}

fn encode_addr(w: &mut Writer, addr: NpduAddress) -> Result<(), EncodeError> {
    if usize::from(addr.mac_len) > addr.mac.len() {
        return Err(EncodeError::ValueOutOfRange);
    }
    w.write_be_u16(addr.network)?;
    w.write_u8(addr.mac_len)?;
    w.write_all(&addr.mac[..usize::from(addr.mac_len)])
}

fn decode_addr(r: &mut Reader<'_>) -> Result<NpduAddress, DecodeError> {
    let network = r.read_be_u16()?;
    let mac_len = r.read_u8()?;
    if usize::from(mac_len) > 8 {
        return Err(DecodeError::InvalidLength);
    }
    let mut mac = [0u8; 8];
    mac[..usize::from(mac_len)].copy_from_slice(r.read_exact(usize::from(mac_len))?);
    Ok(NpduAddress {
        network,
        mac,
        mac_len,
    })
}

#[cfg(test)]
mod tests {
    use super::{Npdu, NpduAddress};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;

    #[test]
    fn local_header_is_two_bytes() {
        let mut w = Writer::new();
        Npdu::LOCAL.encode(&mut w).unwrap();
        assert_eq!(w.as_written(), &[0x01, 0x00]);
    }

    #[test]
    fn routed_header_is_skipped() {
        let mut npdu = Npdu::LOCAL;
        npdu.control = 0x28;
        npdu.destination = Some(NpduAddress {
            network: 5,
            mac: [10, 0, 0, 9, 0xBA, 0xC0, 0, 0],
            mac_len: 6,
        });
        npdu.source = Some(NpduAddress {
            network: 2,
            mac: [7, 0, 0, 0, 0, 0, 0, 0],
            mac_len: 1,
        });
        let mut w = Writer::new();
        npdu.encode(&mut w).unwrap();
        w.write_all(&[0x20, 0x01, 0x0F]).unwrap();

        let mut r = Reader::new(w.as_written());
        let decoded = Npdu::decode(&mut r).unwrap();
        assert_eq!(decoded.hop_count, Some(255));
        assert_eq!(decoded.source.unwrap().network, 2);
        assert_eq!(r.rest(), &[0x20, 0x01, 0x0F]);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut r = Reader::new(&[0x02, 0x00]);
        assert_eq!(Npdu::decode(&mut r).unwrap_err(), DecodeError::InvalidValue);
    }
}
