use crate::DataLinkAddress;
use thiserror::Error;

/// Errors that can occur at the data-link layer.
#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame too large")]
    FrameTooLarge,
    #[error("invalid frame")]
    InvalidFrame,
    #[error("transport closed")]
    Closed,
}

/// Send side of a BACnet link.
///
/// Implementors take an already framed packet. [`BacnetIpTransport`](crate::BacnetIpTransport)
/// is the UDP implementation; tests substitute an in-memory link.
pub trait DataLink: Send + Sync {
    /// Sends `packet` to the given data-link `address`.
    async fn send(&self, address: DataLinkAddress, packet: &[u8]) -> Result<(), DataLinkError>;

    /// Sends `packet` to the link's configured broadcast address.
    async fn send_broadcast(&self, packet: &[u8]) -> Result<(), DataLinkError>;
}
