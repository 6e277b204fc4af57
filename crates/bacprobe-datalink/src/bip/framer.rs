//! BVLC + NPDU framing of APDUs.
//!
//! Outbound packets are always `BVLC(4) | NPDU 01 00 | APDU`. Inbound packets
//! may additionally be Forwarded-NPDU (carrying the original sender) or carry
//! routed NPDU address fields, both of which are stripped by [`decode`].

use crate::bip::bvlc::{BvlcFunction, BvlcHeader, BVLC_HEADER_LEN};
use crate::DataLinkError;
use bacprobe_core::encoding::{reader::Reader, writer::Writer};
use bacprobe_core::npdu::Npdu;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const LOCAL_NPDU_LEN: usize = 2;
const FORWARDED_ORIGIN_LEN: usize = 6;

/// A decoded inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub function: BvlcFunction,
    /// Original sender of a Forwarded-NPDU.
    pub origin: Option<SocketAddr>,
    pub apdu: &'a [u8],
}

/// Wraps `apdu` in a BVLC header and the local NPDU header.
///
/// Only the original-unicast and original-broadcast functions can be framed;
/// anything else is [`DataLinkError::InvalidFrame`].
pub fn frame(apdu: &[u8], function: BvlcFunction) -> Result<Vec<u8>, DataLinkError> {
    if !matches!(
        function,
        BvlcFunction::OriginalUnicastNpdu | BvlcFunction::OriginalBroadcastNpdu
    ) {
        return Err(DataLinkError::InvalidFrame);
    }
    let total_len = BVLC_HEADER_LEN + LOCAL_NPDU_LEN + apdu.len();
    let length = u16::try_from(total_len).map_err(|_| DataLinkError::FrameTooLarge)?;

    let mut w = Writer::with_limit(total_len);
    BvlcHeader { function, length }
        .encode(&mut w)
        .map_err(|_| DataLinkError::InvalidFrame)?;
    Npdu::LOCAL
        .encode(&mut w)
        .map_err(|_| DataLinkError::InvalidFrame)?;
    w.write_all(apdu).map_err(|_| DataLinkError::FrameTooLarge)?;
    Ok(w.into_inner())
}

pub fn frame_unicast(apdu: &[u8]) -> Result<Vec<u8>, DataLinkError> {
    frame(apdu, BvlcFunction::OriginalUnicastNpdu)
}

pub fn frame_broadcast(apdu: &[u8]) -> Result<Vec<u8>, DataLinkError> {
    frame(apdu, BvlcFunction::OriginalBroadcastNpdu)
}

/// Returns the APDU of a well-formed application packet, `None` otherwise.
pub fn unframe(packet: &[u8]) -> Option<&[u8]> {
    decode(packet).map(|f| f.apdu)
}

/// Parses an inbound packet down to its APDU.
///
/// Returns `None` for packets too short to hold BVLC and NPDU headers,
/// non-BACnet/IP packets, BVLC functions without an NPDU payload, declared
/// lengths that disagree with the datagram, network layer messages and
/// truncated headers.
pub fn decode(packet: &[u8]) -> Option<Frame<'_>> {
    if packet.len() < BVLC_HEADER_LEN + LOCAL_NPDU_LEN {
        return None;
    }
    let mut r = Reader::new(packet);
    let header = BvlcHeader::decode(&mut r).ok()?;
    if !header.function.carries_npdu() || usize::from(header.length) != packet.len() {
        return None;
    }
    let origin = if header.function == BvlcFunction::ForwardedNpdu {
        let b = r.read_exact(FORWARDED_ORIGIN_LEN).ok()?;
        Some(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(b[0], b[1], b[2], b[3])),
            u16::from_be_bytes([b[4], b[5]]),
        ))
    } else {
        None
    };
    let npdu = Npdu::decode(&mut r).ok()?;
    if npdu.is_network_message() {
        return None;
    }
    Some(Frame {
        function: header.function,
        origin,
        apdu: r.rest(),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode, frame, frame_broadcast, frame_unicast, unframe};
    use crate::bip::bvlc::BvlcFunction;
    use crate::DataLinkError;
    use proptest::prelude::*;
    use std::net::SocketAddr;

    #[test]
    fn unicast_layout() {
        let packet = frame_unicast(&[0x00, 0x0C, 0x01]).unwrap();
        assert_eq!(packet, [0x81, 0x0A, 0x00, 0x09, 0x01, 0x00, 0x00, 0x0C, 0x01]);
    }

    #[test]
    fn broadcast_who_is_layout() {
        let packet = frame_broadcast(&[0x10, 0x08]).unwrap();
        assert_eq!(packet, [0x81, 0x0B, 0x00, 0x08, 0x01, 0x00, 0x10, 0x08]);
    }

    #[test]
    fn oversized_apdu_is_rejected() {
        let apdu = vec![0u8; 65_530];
        assert!(matches!(
            frame_unicast(&apdu),
            Err(DataLinkError::FrameTooLarge)
        ));
        assert!(frame_unicast(&apdu[..65_529]).is_ok());
    }

    #[test]
    fn only_original_functions_frame() {
        assert!(matches!(
            frame(&[0x10, 0x08], BvlcFunction::ForwardedNpdu),
            Err(DataLinkError::InvalidFrame)
        ));
    }

    #[test]
    fn rejects_malformed_packets() {
        // wrong BVLC type
        assert_eq!(unframe(&[0x82, 0x0A, 0x00, 0x06, 0x01, 0x00]), None);
        // BVLC-Result carries no NPDU
        assert_eq!(unframe(&[0x81, 0x00, 0x00, 0x06, 0x00, 0x00]), None);
        // declared length longer than the datagram
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x09, 0x01, 0x00, 0x20]), None);
        // declared length shorter than the datagram
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x06, 0x01, 0x00, 0x20]), None);
        // NPDU version
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x07, 0x02, 0x00, 0x20]), None);
        // network layer message
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x07, 0x01, 0x80, 0x00]), None);
        // destination specifier cut short
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x08, 0x01, 0x20, 0x00, 0x05]), None);
    }

    #[test]
    fn empty_apdu_is_accepted() {
        assert_eq!(unframe(&[0x81, 0x0A, 0x00, 0x06, 0x01, 0x00]), Some(&[][..]));
    }

    #[test]
    fn routed_source_is_skipped() {
        // SNET 2, SLEN 1, SADR 7 then a SimpleAck.
        let packet = [
            0x81, 0x0A, 0x00, 0x0D, 0x01, 0x08, 0x00, 0x02, 0x01, 0x07, 0x20, 0x01, 0x0F,
        ];
        assert_eq!(unframe(&packet), Some(&[0x20, 0x01, 0x0F][..]));
    }

    #[test]
    fn forwarded_npdu_exposes_origin() {
        let packet = [
            0x81, 0x04, 0x00, 0x0E, 10, 1, 2, 3, 0xBA, 0xC0, 0x01, 0x00, 0x10, 0x00,
        ];
        let frame = decode(&packet).unwrap();
        assert_eq!(frame.function, BvlcFunction::ForwardedNpdu);
        assert_eq!(
            frame.origin,
            Some("10.1.2.3:47808".parse::<SocketAddr>().unwrap())
        );
        assert_eq!(frame.apdu, &[0x10, 0x00]);
    }

    proptest! {
        #[test]
        fn frame_then_unframe_is_identity(len in 0usize..65_000, seed in any::<u8>()) {
            let apdu: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_add(seed)).collect();
            let packet = frame_unicast(&apdu).unwrap();
            prop_assert_eq!(packet.len(), apdu.len() + 6);
            prop_assert_eq!(unframe(&packet), Some(apdu.as_slice()));
        }

        #[test]
        fn short_inputs_unframe_to_none(bytes in proptest::collection::vec(any::<u8>(), 0..6)) {
            prop_assert_eq!(unframe(&bytes), None);
        }
    }
}
