use crate::correlator::{Correlator, Reply};
use crate::discovery::{Aggregator, DiscoveredDevice};
use crate::dispatcher::Dispatcher;
use crate::error::remote_service_error;
use crate::{ClientConfig, ClientError};
use bacprobe_core::apdu::BacnetError;
use bacprobe_core::services::{ReinitializeKind, ServiceRequest};
use bacprobe_core::types::{ObjectId, PropertyId, PropertyValue};
use bacprobe_datalink::bip::framer;
use bacprobe_datalink::{BacnetIpTransport, DataLink, DataLinkAddress, Inbound};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Async BACnet/IP client.
///
/// Requests from any number of tasks may be in flight at once; responses are
/// matched to their requests by invoke id. Two background tasks run for the
/// lifetime of the client, one dispatching inbound datagrams and one sweeping
/// expired requests. Both stop when the client is dropped.
#[derive(Debug)]
pub struct BacnetClient<D: DataLink> {
    datalink: D,
    correlator: Arc<Correlator>,
    aggregator: Arc<Aggregator>,
    config: ClientConfig,
    _tasks: BackgroundTasks,
}

#[derive(Debug)]
struct BackgroundTasks {
    driver: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.driver.abort();
        self.sweeper.abort();
    }
}

impl BacnetClient<BacnetIpTransport> {
    /// Binds a UDP transport with default settings.
    pub async fn new() -> Result<Self, ClientError> {
        Self::bind(ClientConfig::default()).await
    }

    pub async fn bind(config: ClientConfig) -> Result<Self, ClientError> {
        let (transport, inbound) = BacnetIpTransport::bind(config.bip()).await?;
        Ok(Self::with_datalink(transport, inbound, config))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.datalink.local_addr()
    }

    /// Closes the transport. Outstanding requests resolve as unanswered and
    /// later requests fail with [`DataLinkError::Closed`](bacprobe_datalink::DataLinkError::Closed).
    pub fn close(&self) {
        self.datalink.close();
        self.correlator.clear();
    }
}

impl<D: DataLink> BacnetClient<D> {
    /// Builds a client over any link. `inbound` must deliver raw BACnet/IP
    /// packets with their source address. Must be called within a Tokio
    /// runtime.
    pub fn with_datalink(datalink: D, inbound: Inbound, config: ClientConfig) -> Self {
        let correlator = Arc::new(Correlator::new());
        let aggregator = Arc::new(Aggregator::new());
        let dispatcher = Dispatcher::new(correlator.clone(), aggregator.clone());

        let driver = tokio::spawn(drive(inbound, dispatcher));
        let sweeper = tokio::spawn(sweep(correlator.clone(), config.sweep_interval));

        Self {
            datalink,
            correlator,
            aggregator,
            config,
            _tasks: BackgroundTasks { driver, sweeper },
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of confirmed requests still awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending()
    }

    /// Sends `request` to `destination` and waits for its response.
    ///
    /// `Ok(None)` means nothing arrived within `timeout` (or the configured
    /// response timeout). Unconfirmed requests are sent and return `Ok(None)`
    /// immediately.
    pub async fn request(
        &self,
        destination: DataLinkAddress,
        request: &ServiceRequest,
        timeout: Option<Duration>,
    ) -> Result<Option<Reply>, ClientError> {
        if !request.is_confirmed() {
            let packet = framer::frame_unicast(&request.encode(0)?)?;
            self.datalink.send(destination, &packet).await?;
            return Ok(None);
        }

        let timeout = timeout.unwrap_or(self.config.response_timeout);
        let handle = self.correlator.register(destination, timeout)?;
        let packet = framer::frame_unicast(&request.encode(handle.invoke_id())?)?;
        log::debug!(
            "sending {} to {destination} with invoke id {}",
            request.name(),
            handle.invoke_id()
        );
        self.datalink.send(destination, &packet).await?;
        Ok(handle.wait().await)
    }

    pub async fn read_property(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        property: PropertyId,
    ) -> Result<Option<PropertyValue>, ClientError> {
        self.read_property_with(destination, object, property, None, None)
            .await
    }

    /// Reads one property. `Ok(None)` means the device did not answer.
    pub async fn read_property_with(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        property: PropertyId,
        array_index: Option<u32>,
        timeout: Option<Duration>,
    ) -> Result<Option<PropertyValue>, ClientError> {
        let request = ServiceRequest::ReadProperty {
            object,
            property,
            array_index,
        };
        match self.request(destination, &request, timeout).await? {
            None => Ok(None),
            Some(Reply::ComplexAck(value)) => Ok(Some(value)),
            Some(Reply::SimpleAck) => Err(ClientError::UnexpectedResponse),
            Some(other) => Err(remote_failure(other)),
        }
    }

    /// Writes one property and waits for the acknowledgement.
    ///
    /// `Ok(true)` when acknowledged, `Ok(false)` when no response arrived.
    pub async fn write_property(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        property: PropertyId,
        value: PropertyValue,
        priority: Option<u8>,
    ) -> Result<bool, ClientError> {
        let request = ServiceRequest::WriteProperty {
            object,
            property,
            value,
            priority,
            array_index: None,
        };
        self.acknowledged(destination, &request).await
    }

    /// Broadcasts a Who-Is (or unicasts it to `direct_target`) and collects
    /// I-Am responses for `window`.
    pub async fn who_is(
        &self,
        range: Option<(u32, u32)>,
        window: Duration,
        direct_target: Option<DataLinkAddress>,
    ) -> Result<Vec<DiscoveredDevice>, ClientError> {
        let request = match range {
            Some((low, high)) => ServiceRequest::WhoIs { low, high },
            None => ServiceRequest::who_is_all(),
        };
        let apdu = request.encode(0)?;
        let collecting = self.aggregator.begin(window)?;

        match direct_target {
            Some(target) => {
                let packet = framer::frame_unicast(&apdu)?;
                self.datalink.send(target, &packet).await?;
            }
            None => {
                let packet = framer::frame_broadcast(&apdu)?;
                self.datalink.send_broadcast(&packet).await?;
            }
        }
        log::debug!("who-is sent, collecting for {window:?}");
        Ok(collecting.collect().await)
    }

    /// Global Who-Is. A `window` of `None` uses the configured discovery timeout.
    pub async fn discover(
        &self,
        window: Option<Duration>,
        direct_target: Option<DataLinkAddress>,
    ) -> Result<Vec<DiscoveredDevice>, ClientError> {
        self.who_is(
            None,
            window.unwrap_or(self.config.discovery_timeout),
            direct_target,
        )
        .await
    }

    pub async fn device_communication_control(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        command: &str,
        arguments: &[String],
    ) -> Result<bool, ClientError> {
        let request = ServiceRequest::DeviceCommunicationControl {
            object,
            command: command.to_string(),
            arguments: arguments.to_vec(),
        };
        self.acknowledged(destination, &request).await
    }

    pub async fn reinitialize_device(
        &self,
        destination: DataLinkAddress,
        kind: ReinitializeKind,
    ) -> Result<bool, ClientError> {
        self.acknowledged(destination, &ServiceRequest::ReinitializeDevice { kind })
            .await
    }

    pub async fn acknowledge_alarm(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        action: &str,
    ) -> Result<bool, ClientError> {
        let request = ServiceRequest::AcknowledgeAlarm {
            object,
            action: action.to_string(),
        };
        self.acknowledged(destination, &request).await
    }

    pub async fn create_object(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        properties: Vec<(PropertyId, PropertyValue)>,
    ) -> Result<bool, ClientError> {
        self.acknowledged(
            destination,
            &ServiceRequest::CreateObject { object, properties },
        )
        .await
    }

    pub async fn delete_object(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
    ) -> Result<bool, ClientError> {
        self.acknowledged(destination, &ServiceRequest::DeleteObject { object })
            .await
    }

    pub async fn subscribe_cov(
        &self,
        destination: DataLinkAddress,
        object: ObjectId,
        property: PropertyId,
    ) -> Result<bool, ClientError> {
        self.acknowledged(
            destination,
            &ServiceRequest::SubscribeCov { object, property },
        )
        .await
    }

    async fn acknowledged(
        &self,
        destination: DataLinkAddress,
        request: &ServiceRequest,
    ) -> Result<bool, ClientError> {
        match self.request(destination, request, None).await? {
            None => Ok(false),
            Some(Reply::SimpleAck | Reply::ComplexAck(_)) => Ok(true),
            Some(other) => Err(remote_failure(other)),
        }
    }
}

fn remote_failure(reply: Reply) -> ClientError {
    match reply {
        Reply::Error {
            service_choice,
            error_class,
            error_code,
        } => remote_service_error(BacnetError {
            invoke_id: 0,
            service_choice,
            error_class,
            error_code,
        }),
        Reply::Reject { reason } => ClientError::RemoteReject { reason },
        Reply::Abort { reason, server } => ClientError::RemoteAbort { reason, server },
        Reply::SimpleAck | Reply::ComplexAck(_) => ClientError::UnexpectedResponse,
    }
}

async fn drive(mut inbound: Inbound, dispatcher: Dispatcher) {
    while let Some((packet, source)) = inbound.recv().await {
        let Some(frame) = framer::decode(&packet) else {
            log::debug!("dropping unframeable datagram from {source}");
            continue;
        };
        let source = frame.origin.map(DataLinkAddress::Ip).unwrap_or(source);
        dispatcher.on_datagram(frame.apdu, source);
    }
    log::debug!("inbound channel closed, dispatcher stopping");
}

async fn sweep(correlator: Arc<Correlator>, period: Duration) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let expired = correlator.sweep();
        if expired > 0 {
            log::debug!("swept {expired} expired request(s)");
        }
    }
}
