//! In-memory links for unit tests.

use crate::{BacnetClient, ClientConfig, SimulatedDevice};
use bacprobe_datalink::{DataLink, DataLinkAddress, DataLinkError, Inbound};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One end of a connected pair. Unicast and broadcast both reach the peer,
/// stamped with this end's address.
#[derive(Debug, Clone)]
pub(crate) struct MemoryLink {
    local: DataLinkAddress,
    peer: DataLinkAddress,
    tx: mpsc::Sender<(Vec<u8>, DataLinkAddress)>,
}

impl MemoryLink {
    pub(crate) fn local(&self) -> DataLinkAddress {
        self.local
    }

    pub(crate) fn peer(&self) -> DataLinkAddress {
        self.peer
    }

    async fn deliver(&self, packet: &[u8]) -> Result<(), DataLinkError> {
        self.tx
            .send((packet.to_vec(), self.local))
            .await
            .map_err(|_| DataLinkError::Closed)
    }
}

impl DataLink for MemoryLink {
    async fn send(&self, address: DataLinkAddress, packet: &[u8]) -> Result<(), DataLinkError> {
        if address != self.peer {
            return Ok(());
        }
        self.deliver(packet).await
    }

    async fn send_broadcast(&self, packet: &[u8]) -> Result<(), DataLinkError> {
        self.deliver(packet).await
    }
}

fn ip(s: &str) -> DataLinkAddress {
    DataLinkAddress::Ip(s.parse::<SocketAddr>().unwrap())
}

/// A client end at 10.0.0.1 and a device end at 10.0.0.2.
pub(crate) fn memory_pair() -> ((MemoryLink, Inbound), (MemoryLink, Inbound)) {
    let client = ip("10.0.0.1:47808");
    let device = ip("10.0.0.2:47808");
    let (to_client, client_rx) = mpsc::channel(64);
    let (to_device, device_rx) = mpsc::channel(64);
    (
        (
            MemoryLink {
                local: client,
                peer: device,
                tx: to_device,
            },
            client_rx,
        ),
        (
            MemoryLink {
                local: device,
                peer: client,
                tx: to_client,
            },
            device_rx,
        ),
    )
}

/// A client wired to a running [`SimulatedDevice`], plus the device's address.
pub(crate) fn simulated(
    instance: u32,
    config: ClientConfig,
) -> (
    BacnetClient<MemoryLink>,
    Arc<SimulatedDevice<MemoryLink>>,
    DataLinkAddress,
) {
    let ((client_link, client_rx), (device_link, device_rx)) = memory_pair();
    let device_addr = device_link.local();
    let device = Arc::new(SimulatedDevice::new(instance, device_link).unwrap());
    let serving = device.clone();
    tokio::spawn(async move { serving.run(device_rx).await });
    (
        BacnetClient::with_datalink(client_link, client_rx, config),
        device,
        device_addr,
    )
}
