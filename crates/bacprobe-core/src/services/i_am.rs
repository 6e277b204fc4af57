use crate::apdu::UnconfirmedRequestHeader;
use crate::encoding::{tag, writer::Writer};
use crate::services::value_codec::decode_object_id;
use crate::types::ObjectId;
use crate::EncodeError;

pub const SERVICE_I_AM: u8 = 0x00;

const MAX_APDU_TAG: u8 = 0x22;
const SEGMENTATION_TAG: u8 = 0x91;
const VENDOR_ID_TAG: u8 = 0x21;
const NO_SEGMENTATION: u8 = 0x03;

/// I-Am announcement as sent by the simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IAmRequest {
    pub device_id: ObjectId,
    pub max_apdu: u16,
    pub vendor_id: u8,
}

impl IAmRequest {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        UnconfirmedRequestHeader {
            service_choice: SERVICE_I_AM,
        }
        .encode(w)?;
        w.write_u8(tag::APP_OBJECT_ID)?;
        w.write_be_u32(self.device_id.raw())?;
        w.write_u8(MAX_APDU_TAG)?;
        w.write_be_u16(self.max_apdu)?;
        w.write_u8(SEGMENTATION_TAG)?;
        w.write_u8(NO_SEGMENTATION)?;
        w.write_u8(VENDOR_ID_TAG)?;
        w.write_u8(self.vendor_id)
    }
}

/// Device identity carried by an I-Am APDU, or `None` when the APDU is not
/// an I-Am or its identifier is missing.
pub fn device_id(apdu: &[u8]) -> Option<ObjectId> {
    match apdu {
        [0x10, SERVICE_I_AM, rest @ ..] => decode_object_id(rest),
        _ => None,
    }
}
