use crate::{DataLink, DataLinkAddress, DataLinkError};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};

const MAX_DATAGRAM_LEN: usize = 65_535;

/// Inbound datagrams as delivered by the receive pump.
pub type Inbound = mpsc::Receiver<(Vec<u8>, DataLinkAddress)>;

/// UDP endpoint settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BipConfig {
    pub bind_addr: SocketAddr,
    pub broadcast_addr: SocketAddr,
    /// Capacity of the inbound datagram channel.
    pub queue_depth: usize,
}

impl Default for BipConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            broadcast_addr: DataLinkAddress::local_broadcast(
                DataLinkAddress::BACNET_IP_DEFAULT_PORT,
            )
            .as_socket_addr(),
            queue_depth: 256,
        }
    }
}

/// BACnet/IP over one broadcast-enabled UDP socket.
///
/// A spawned pump task forwards every received datagram, with its source,
/// to the [`Inbound`] channel returned from [`bind`](Self::bind). Framing is
/// left to the caller.
#[derive(Debug)]
pub struct BacnetIpTransport {
    socket: Mutex<Option<Arc<UdpSocket>>>,
    local_addr: SocketAddr,
    broadcast_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
}

impl BacnetIpTransport {
    /// Binds the socket and starts the receive pump.
    ///
    /// When the requested port is already taken the transport falls back to
    /// an ephemeral port on the same interface. Must be called within a
    /// Tokio runtime.
    pub async fn bind(config: BipConfig) -> Result<(Self, Inbound), DataLinkError> {
        let socket = match UdpSocket::bind(config.bind_addr).await {
            Ok(socket) => socket,
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && config.bind_addr.port() != 0 => {
                let fallback = SocketAddr::new(config.bind_addr.ip(), 0);
                log::warn!(
                    "port {} in use, falling back to an ephemeral port",
                    config.bind_addr.port()
                );
                UdpSocket::bind(fallback).await?
            }
            Err(e) => return Err(e.into()),
        };
        socket.set_broadcast(true)?;
        let local_addr = socket.local_addr()?;
        let socket = Arc::new(socket);

        let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
        let (shutdown, shutdown_rx) = watch::channel(false);
        tokio::spawn(pump(socket.clone(), tx, shutdown_rx));
        log::debug!("bacnet/ip transport bound to {local_addr}");

        Ok((
            Self {
                socket: Mutex::new(Some(socket)),
                local_addr,
                broadcast_addr: config.broadcast_addr,
                shutdown,
            },
            rx,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn broadcast_addr(&self) -> SocketAddr {
        self.broadcast_addr
    }

    pub fn is_closed(&self) -> bool {
        self.socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stops the pump, releases the socket and ends the inbound channel.
    /// Closing twice is a no-op.
    pub fn close(&self) {
        let socket = self
            .socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if socket.is_some() {
            let _ = self.shutdown.send(true);
            log::debug!("bacnet/ip transport on {} closed", self.local_addr);
        }
    }

    fn socket(&self) -> Result<Arc<UdpSocket>, DataLinkError> {
        self.socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DataLinkError::Closed)
    }

    async fn send_to(&self, target: SocketAddr, packet: &[u8]) -> Result<(), DataLinkError> {
        let socket = self.socket()?;
        socket.send_to(packet, target).await?;
        Ok(())
    }
}

impl Drop for BacnetIpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl DataLink for BacnetIpTransport {
    async fn send(&self, address: DataLinkAddress, packet: &[u8]) -> Result<(), DataLinkError> {
        self.send_to(address.as_socket_addr(), packet).await
    }

    async fn send_broadcast(&self, packet: &[u8]) -> Result<(), DataLinkError> {
        self.send_to(self.broadcast_addr, packet).await
    }
}

async fn pump(
    socket: Arc<UdpSocket>,
    tx: mpsc::Sender<(Vec<u8>, DataLinkAddress)>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            received = socket.recv_from(&mut buf) => match received {
                Ok((n, src)) => {
                    match tx.try_send((buf[..n].to_vec(), DataLinkAddress::Ip(src))) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            log::warn!("inbound queue full, dropping datagram from {src}");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => break,
                    }
                }
                Err(e) => log::warn!("udp receive error: {e}"),
            },
        }
    }
}
