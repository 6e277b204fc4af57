//! BACnet/IP packet framing and the UDP transport used by `bacprobe-client`.
//!
//! The [`DataLink`] trait is the send-side seam; inbound datagrams arrive on
//! the bounded channel returned by [`BacnetIpTransport::bind`].

#![allow(async_fn_in_trait)]

pub mod address;
pub mod bip;
pub mod traits;

pub use address::DataLinkAddress;
pub use bip::framer::{frame, frame_broadcast, frame_unicast, unframe, Frame};
pub use bip::transport::{BacnetIpTransport, BipConfig, Inbound};
pub use traits::{DataLink, DataLinkError};
