use bacprobe_datalink::{BipConfig, DataLinkAddress};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Client settings. Every field has a working default; use the `with_*`
/// builders to override individual values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub bind_addr: SocketAddr,
    pub broadcast_addr: SocketAddr,
    /// How long a confirmed request waits for its response.
    pub response_timeout: Duration,
    /// Default discovery collection window.
    pub discovery_timeout: Duration,
    /// Period of the expired-request sweep.
    pub sweep_interval: Duration,
    /// Capacity of the inbound datagram queue.
    pub queue_depth: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            broadcast_addr: DataLinkAddress::local_broadcast(
                DataLinkAddress::BACNET_IP_DEFAULT_PORT,
            )
            .as_socket_addr(),
            response_timeout: Duration::from_secs(3),
            discovery_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(1),
            queue_depth: 256,
        }
    }
}

impl ClientConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_broadcast_addr(mut self, addr: SocketAddr) -> Self {
        self.broadcast_addr = addr;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    pub fn bip(&self) -> BipConfig {
        BipConfig {
            bind_addr: self.bind_addr,
            broadcast_addr: self.broadcast_addr,
            queue_depth: self.queue_depth,
        }
    }
}
