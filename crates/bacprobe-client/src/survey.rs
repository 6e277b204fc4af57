//! Device surveys: enumeration, permission probing and connection tests.
//!
//! These run a fixed sequence of reads (and, for permissions, reversible
//! writes) and gather every outcome into a report. A remote error or a
//! missing response is recorded in the report; only local failures such as
//! a closed transport abort a survey.

use crate::{BacnetClient, ClientError};
use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
use bacprobe_datalink::{DataLink, DataLinkAddress};
use std::ops::RangeInclusive;

/// Device object properties read by [`enumerate_device`].
pub const DEVICE_PROPERTIES: [PropertyId; 13] = [
    PropertyId::ObjectName,
    PropertyId::VendorName,
    PropertyId::VendorIdentifier,
    PropertyId::ModelName,
    PropertyId::FirmwareRevision,
    PropertyId::ApplicationSoftwareVersion,
    PropertyId::Location,
    PropertyId::Description,
    PropertyId::ProtocolVersion,
    PropertyId::ProtocolRevision,
    PropertyId::SystemStatus,
    PropertyId::MaxApduLengthAccepted,
    PropertyId::SegmentationSupported,
];

/// Object types probed by [`enumerate_device`].
pub const PROBED_OBJECT_TYPES: [ObjectType; 9] = [
    ObjectType::AnalogInput,
    ObjectType::AnalogOutput,
    ObjectType::AnalogValue,
    ObjectType::BinaryInput,
    ObjectType::BinaryOutput,
    ObjectType::BinaryValue,
    ObjectType::MultiStateInput,
    ObjectType::MultiStateOutput,
    ObjectType::MultiStateValue,
];

/// Instances probed for each type.
pub const PROBED_INSTANCES: RangeInclusive<u32> = 1..=5;

/// Properties read by [`check_permissions`].
pub const PERMISSION_READ_PROPERTIES: [PropertyId; 7] = [
    PropertyId::ObjectName,
    PropertyId::PresentValue,
    PropertyId::Description,
    PropertyId::Units,
    PropertyId::StatusFlags,
    PropertyId::Reliability,
    PropertyId::OutOfService,
];

const TEST_DESCRIPTION: &str = "Test Write";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "outcome", content = "detail"))]
pub enum ReadOutcome {
    Value(PropertyValue),
    NoResponse,
    /// The device answered with an Error, Reject or Abort.
    Refused(String),
}

impl ReadOutcome {
    pub fn value(&self) -> Option<&PropertyValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyReading {
    pub property: PropertyId,
    pub outcome: ReadOutcome,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectReport {
    pub object: ObjectId,
    pub object_name: PropertyValue,
    pub present_value: ReadOutcome,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceReport {
    pub address: DataLinkAddress,
    pub device: ObjectId,
    pub properties: Vec<PropertyReading>,
    /// Objects that answered an objectName read, in probe order.
    pub objects: Vec<ObjectReport>,
}

impl DeviceReport {
    pub fn objects_of(&self, object_type: ObjectType) -> impl Iterator<Item = &ObjectReport> {
        self.objects
            .iter()
            .filter(move |o| o.object.object_type() == object_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "outcome", content = "detail"))]
pub enum WriteOutcome {
    Writable,
    Denied(String),
    NoResponse,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WriteCheck {
    pub property: PropertyId,
    pub outcome: WriteOutcome,
    /// Whether the original value was written back afterwards.
    pub restored: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PermissionReport {
    pub address: DataLinkAddress,
    pub object: ObjectId,
    pub reads: Vec<PropertyReading>,
    pub writes: Vec<WriteCheck>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConnectionReport {
    pub address: DataLinkAddress,
    pub device: ObjectId,
    pub outcome: ReadOutcome,
}

impl ConnectionReport {
    pub fn is_connected(&self) -> bool {
        matches!(self.outcome, ReadOutcome::Value(_))
    }

    pub fn device_name(&self) -> Option<&PropertyValue> {
        self.outcome.value()
    }
}

async fn read<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    object: ObjectId,
    property: PropertyId,
) -> Result<ReadOutcome, ClientError> {
    match client.read_property(destination, object, property).await {
        Ok(Some(value)) => Ok(ReadOutcome::Value(value)),
        Ok(None) => Ok(ReadOutcome::NoResponse),
        Err(e) if e.is_remote() => Ok(ReadOutcome::Refused(e.to_string())),
        Err(e) => Err(e),
    }
}

async fn write<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    object: ObjectId,
    property: PropertyId,
    value: PropertyValue,
) -> Result<WriteOutcome, ClientError> {
    match client
        .write_property(destination, object, property, value, None)
        .await
    {
        Ok(true) => Ok(WriteOutcome::Writable),
        Ok(false) => Ok(WriteOutcome::NoResponse),
        Err(e) if e.is_remote() => Ok(WriteOutcome::Denied(e.to_string())),
        Err(e) => Err(e),
    }
}

/// Reads the standard device properties of `device`, then probes the first
/// few instances of the common I/O object types.
pub async fn enumerate_device<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    device: ObjectId,
) -> Result<DeviceReport, ClientError> {
    let mut properties = Vec::with_capacity(DEVICE_PROPERTIES.len());
    for property in DEVICE_PROPERTIES {
        properties.push(PropertyReading {
            property,
            outcome: read(client, destination, device, property).await?,
        });
    }

    let mut objects = Vec::new();
    for object_type in PROBED_OBJECT_TYPES {
        for instance in PROBED_INSTANCES {
            let object = ObjectId::new(object_type, instance)?;
            let ReadOutcome::Value(object_name) =
                read(client, destination, object, PropertyId::ObjectName).await?
            else {
                continue;
            };
            let present_value = read(client, destination, object, PropertyId::PresentValue).await?;
            objects.push(ObjectReport {
                object,
                object_name,
                present_value,
            });
        }
    }
    log::debug!(
        "enumerated {device} at {destination}: {} object(s) found",
        objects.len()
    );

    Ok(DeviceReport {
        address: destination,
        device,
        properties,
        objects,
    })
}

/// Probes which common properties of `object` can be read, then test-writes
/// outOfService and description and restores them.
pub async fn check_permissions<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    object: ObjectId,
) -> Result<PermissionReport, ClientError> {
    let mut reads = Vec::with_capacity(PERMISSION_READ_PROPERTIES.len());
    for property in PERMISSION_READ_PROPERTIES {
        reads.push(PropertyReading {
            property,
            outcome: read(client, destination, object, property).await?,
        });
    }
    let original_description = reads
        .iter()
        .find(|r| r.property == PropertyId::Description)
        .and_then(|r| r.outcome.value())
        .and_then(PropertyValue::as_str)
        .map(str::to_owned);

    let mut writes = Vec::with_capacity(2);

    let outcome = write(
        client,
        destination,
        object,
        PropertyId::OutOfService,
        PropertyValue::Boolean(true),
    )
    .await?;
    let restored = outcome == WriteOutcome::Writable
        && write(
            client,
            destination,
            object,
            PropertyId::OutOfService,
            PropertyValue::Boolean(false),
        )
        .await?
            == WriteOutcome::Writable;
    writes.push(WriteCheck {
        property: PropertyId::OutOfService,
        outcome,
        restored,
    });

    let outcome = write(
        client,
        destination,
        object,
        PropertyId::Description,
        TEST_DESCRIPTION.into(),
    )
    .await?;
    let restored = match (&outcome, original_description) {
        (WriteOutcome::Writable, Some(original)) => {
            write(
                client,
                destination,
                object,
                PropertyId::Description,
                original.into(),
            )
            .await?
                == WriteOutcome::Writable
        }
        _ => false,
    };
    writes.push(WriteCheck {
        property: PropertyId::Description,
        outcome,
        restored,
    });

    Ok(PermissionReport {
        address: destination,
        object,
        reads,
        writes,
    })
}

/// Reads objectName of `device`.
pub async fn test_connection<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    device: ObjectId,
) -> Result<ConnectionReport, ClientError> {
    Ok(ConnectionReport {
        address: destination,
        device,
        outcome: read(client, destination, device, PropertyId::ObjectName).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        check_permissions, enumerate_device, test_connection, ReadOutcome, WriteOutcome,
        DEVICE_PROPERTIES,
    };
    use crate::testing::{memory_pair, simulated, MemoryLink};
    use crate::{BacnetClient, ClientConfig, ClientError, SimulatedDevice};
    use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
    use bacprobe_datalink::{DataLink, DataLinkAddress, DataLinkError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Forwards the first `remaining` sends, then reports the link closed.
    struct FailingLink {
        inner: MemoryLink,
        remaining: AtomicUsize,
    }

    impl FailingLink {
        fn take(&self) -> Result<(), DataLinkError> {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .map(|_| ())
                .map_err(|_| DataLinkError::Closed)
        }
    }

    impl DataLink for FailingLink {
        async fn send(&self, address: DataLinkAddress, packet: &[u8]) -> Result<(), DataLinkError> {
            self.take()?;
            self.inner.send(address, packet).await
        }

        async fn send_broadcast(&self, packet: &[u8]) -> Result<(), DataLinkError> {
            self.take()?;
            self.inner.send_broadcast(packet).await
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::default().with_response_timeout(Duration::from_millis(300))
    }

    #[tokio::test]
    async fn enumeration_reports_device_and_found_objects() {
        let (client, device, addr) = simulated(20, config());
        let ai1 = ObjectId::new(ObjectType::AnalogInput, 1).unwrap();
        let bv3 = ObjectId::new(ObjectType::BinaryValue, 3).unwrap();
        device
            .add_object(
                ai1,
                [
                    (PropertyId::ObjectName, "Zone Temp".into()),
                    (PropertyId::PresentValue, PropertyValue::Real(21.5)),
                ],
            )
            .await;
        device
            .add_object(bv3, [(PropertyId::ObjectName, PropertyValue::from("Fan Enable"))])
            .await;

        let report = enumerate_device(&client, addr, device.device_id())
            .await
            .unwrap();
        assert_eq!(report.properties.len(), DEVICE_PROPERTIES.len());
        assert_eq!(
            report.properties[0].outcome,
            ReadOutcome::Value("SimDevice-20".into())
        );
        assert!(report
            .properties
            .iter()
            .all(|p| matches!(p.outcome, ReadOutcome::Value(_))));

        assert_eq!(report.objects.len(), 2);
        assert_eq!(report.objects[0].object, ai1);
        assert_eq!(report.objects[0].object_name, PropertyValue::from("Zone Temp"));
        assert_eq!(
            report.objects[0].present_value,
            ReadOutcome::Value(PropertyValue::Real(21.5))
        );
        assert!(matches!(
            report.objects[1].present_value,
            ReadOutcome::Refused(_)
        ));
        assert_eq!(report.objects_of(ObjectType::BinaryValue).count(), 1);
    }

    #[tokio::test]
    async fn permission_probe_restores_what_it_changes() {
        let (client, device, addr) = simulated(20, config());
        let av = ObjectId::new(ObjectType::AnalogValue, 2).unwrap();
        device
            .add_object(
                av,
                [
                    (PropertyId::ObjectName, "Setpoint".into()),
                    (PropertyId::Description, "Cooling setpoint".into()),
                    (PropertyId::PresentValue, PropertyValue::Real(24.0)),
                ],
            )
            .await;

        let report = check_permissions(&client, addr, av).await.unwrap();
        assert_eq!(report.reads.len(), 7);
        let units = report
            .reads
            .iter()
            .find(|r| r.property == PropertyId::Units)
            .unwrap();
        assert!(matches!(units.outcome, ReadOutcome::Refused(_)));

        assert_eq!(report.writes.len(), 2);
        assert!(report
            .writes
            .iter()
            .all(|w| w.outcome == WriteOutcome::Writable && w.restored));
        assert_eq!(
            device.property(av, PropertyId::Description).await,
            Some(PropertyValue::from("Cooling setpoint"))
        );
        assert_eq!(
            device.property(av, PropertyId::OutOfService).await,
            Some(PropertyValue::Boolean(false))
        );
    }

    #[tokio::test]
    async fn permission_probe_on_missing_object_is_denied() {
        let (client, _device, addr) = simulated(20, config());
        let missing = ObjectId::new(ObjectType::AnalogValue, 99).unwrap();
        let report = check_permissions(&client, addr, missing).await.unwrap();
        assert!(report
            .writes
            .iter()
            .all(|w| matches!(w.outcome, WriteOutcome::Denied(_)) && !w.restored));
    }

    #[tokio::test]
    async fn connection_test_distinguishes_silence() {
        let (client, device, addr) = simulated(20, config());
        let ok = test_connection(&client, addr, device.device_id())
            .await
            .unwrap();
        assert!(ok.is_connected());
        assert_eq!(ok.device_name(), Some(&PropertyValue::from("SimDevice-20")));

        let silent = DataLinkAddress::Ip("10.9.9.9:47808".parse().unwrap());
        let report = test_connection(&client, silent, device.device_id())
            .await
            .unwrap();
        assert!(!report.is_connected());
        assert_eq!(report.outcome, ReadOutcome::NoResponse);
    }

    #[tokio::test]
    async fn local_failure_during_restore_is_an_error() {
        let ((client_link, client_rx), (device_link, device_rx)) = memory_pair();
        let addr = device_link.local();
        let device = Arc::new(SimulatedDevice::new(20, device_link).unwrap());
        let serving = device.clone();
        tokio::spawn(async move { serving.run(device_rx).await });
        let av = ObjectId::new(ObjectType::AnalogValue, 1).unwrap();
        device
            .add_object(av, [(PropertyId::Description, PropertyValue::from("Setpoint"))])
            .await;

        // Seven reads and the outOfService test write go out; the restore does not.
        let link = FailingLink {
            inner: client_link,
            remaining: AtomicUsize::new(8),
        };
        let client = BacnetClient::with_datalink(link, client_rx, config());
        let err = check_permissions(&client, addr, av).await.unwrap_err();
        assert!(matches!(err, ClientError::DataLink(DataLinkError::Closed)));
        assert_eq!(
            device.property(av, PropertyId::OutOfService).await,
            Some(PropertyValue::Boolean(true))
        );
    }
}
