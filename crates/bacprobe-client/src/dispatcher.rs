use crate::correlator::{Correlator, Reply};
use crate::discovery::Aggregator;
use bacprobe_core::apdu::{
    AbortPdu, ApduType, BacnetError, ComplexAckHeader, RejectPdu, SimpleAck,
    UnconfirmedRequestHeader,
};
use bacprobe_core::encoding::reader::Reader;
use bacprobe_core::services::{i_am, value_codec::decode_value, SERVICE_I_AM};
use bacprobe_core::types::ObjectId;
use bacprobe_core::DecodeError;
use bacprobe_datalink::DataLinkAddress;
use std::sync::Arc;

/// What became of one inbound APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// An I-Am, and whether an open discovery window recorded it.
    Announcement {
        device_id: Option<ObjectId>,
        recorded: bool,
    },
    /// A response, and whether it matched a pending request.
    Response { invoke_id: u8, matched: bool },
    Dropped,
}

/// Routes inbound APDUs to the discovery aggregator or the correlator.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    correlator: Arc<Correlator>,
    aggregator: Arc<Aggregator>,
}

impl Dispatcher {
    pub fn new(correlator: Arc<Correlator>, aggregator: Arc<Aggregator>) -> Self {
        Self {
            correlator,
            aggregator,
        }
    }

    /// Classifies `apdu` by its PDU type and hands it on. Nothing here is
    /// fatal; malformed or unexpected input is logged and dropped.
    pub fn on_datagram(&self, apdu: &[u8], source: DataLinkAddress) -> Dispatch {
        match ApduType::of(apdu) {
            Some(ApduType::UnconfirmedRequest) => self.on_unconfirmed(apdu, source),
            Some(kind) if kind.is_response() => match decode_reply(kind, apdu) {
                Ok((invoke_id, reply)) => Dispatch::Response {
                    invoke_id,
                    matched: self.correlator.resolve(invoke_id, source, reply),
                },
                Err(e) => {
                    log::debug!("dropping {kind:?} from {source}: {e}");
                    Dispatch::Dropped
                }
            },
            kind => {
                log::debug!("dropping apdu from {source} with type {kind:?}");
                Dispatch::Dropped
            }
        }
    }

    fn on_unconfirmed(&self, apdu: &[u8], source: DataLinkAddress) -> Dispatch {
        let mut r = Reader::new(apdu);
        match UnconfirmedRequestHeader::decode(&mut r) {
            Ok(header) if header.service_choice == SERVICE_I_AM => {
                let device_id = i_am::device_id(apdu);
                if device_id.is_none() {
                    log::debug!("i-am from {source} without a readable device identifier");
                }
                Dispatch::Announcement {
                    device_id,
                    recorded: self.aggregator.observe(source, device_id),
                }
            }
            Ok(header) => {
                log::debug!(
                    "ignoring unconfirmed service {} from {source}",
                    header.service_choice
                );
                Dispatch::Dropped
            }
            Err(e) => {
                log::debug!("dropping truncated unconfirmed request from {source}: {e}");
                Dispatch::Dropped
            }
        }
    }
}

fn decode_reply(kind: ApduType, apdu: &[u8]) -> Result<(u8, Reply), DecodeError> {
    let mut r = Reader::new(apdu);
    let decoded = match kind {
        ApduType::SimpleAck => (SimpleAck::decode(&mut r)?.invoke_id, Reply::SimpleAck),
        ApduType::ComplexAck => {
            let header = ComplexAckHeader::decode(&mut r)?;
            (
                header.invoke_id,
                Reply::ComplexAck(decode_value(value_window(r.rest()))),
            )
        }
        ApduType::Error => {
            let err = BacnetError::decode(&mut r)?;
            (
                err.invoke_id,
                Reply::Error {
                    service_choice: err.service_choice,
                    error_class: err.error_class,
                    error_code: err.error_code,
                },
            )
        }
        ApduType::Reject => {
            let rej = RejectPdu::decode(&mut r)?;
            (rej.invoke_id, Reply::Reject { reason: rej.reason })
        }
        ApduType::Abort => {
            let abort = AbortPdu::decode(&mut r)?;
            (
                abort.invoke_id,
                Reply::Abort {
                    reason: abort.reason,
                    server: abort.server,
                },
            )
        }
        _ => return Err(DecodeError::Unsupported),
    };
    Ok(decoded)
}

/// Skips the echoed object, property and optional array index of a
/// ReadProperty-ACK so the scan starts after the opening tag `3E`.
///
/// Bodies that do not follow that layout are scanned whole.
fn value_window(body: &[u8]) -> &[u8] {
    let skip = |rest: &[u8], tag: u8, len: usize| -> Option<usize> {
        (rest.first() == Some(&tag) && rest.len() > len).then_some(1 + len)
    };
    let mut at = match skip(body, 0x0C, 4) {
        Some(n) => n,
        None => return body,
    };
    match skip(&body[at..], 0x19, 1).or_else(|| skip(&body[at..], 0x1A, 2)) {
        Some(n) => at += n,
        None => return body,
    }
    if let Some(n) = skip(&body[at..], 0x29, 1).or_else(|| skip(&body[at..], 0x2A, 2)) {
        at += n;
    }
    match body.get(at) {
        Some(0x3E) => &body[at + 1..],
        _ => body,
    }
}
