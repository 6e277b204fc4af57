pub mod device_management;
pub mod i_am;
pub mod request;
pub mod value_codec;

pub use device_management::{
    ReinitializeKind, SERVICE_DEVICE_COMMUNICATION_CONTROL, SERVICE_REINITIALIZE_DEVICE,
};
pub use i_am::SERVICE_I_AM;
pub use request::{decode_request, ServiceRequest};

pub const SERVICE_ACKNOWLEDGE_ALARM: u8 = 0x00;
pub const SERVICE_SUBSCRIBE_COV: u8 = 0x05;
pub const SERVICE_CREATE_OBJECT: u8 = 0x0A;
pub const SERVICE_DELETE_OBJECT: u8 = 0x0B;
pub const SERVICE_READ_PROPERTY: u8 = 0x0C;
pub const SERVICE_WRITE_PROPERTY: u8 = 0x0F;
pub const SERVICE_WHO_IS: u8 = 0x08;
