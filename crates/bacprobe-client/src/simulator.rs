//! Lightweight simulated BACnet device.
//!
//! [`SimulatedDevice`] answers Who-Is, ReadProperty and WriteProperty from an
//! in-memory object table, and acknowledges the other confirmed services in
//! the supported subset. Useful for testing and development without physical
//! hardware.

use crate::ClientError;
use bacprobe_core::apdu::{
    ApduType, BacnetError, ComplexAckHeader, ConfirmedRequestHeader, RejectPdu, SimpleAck,
};
use bacprobe_core::encoding::{reader::Reader, writer::Writer};
use bacprobe_core::services::i_am::IAmRequest;
use bacprobe_core::services::value_codec::encode_value;
use bacprobe_core::services::{decode_request, ServiceRequest, SERVICE_READ_PROPERTY};
use bacprobe_core::types::{ErrorClass, ErrorCode, ObjectId, ObjectType, PropertyId, PropertyValue};
use bacprobe_core::DecodeError;
use bacprobe_datalink::bip::framer;
use bacprobe_datalink::{DataLink, DataLinkAddress, Inbound};
use std::collections::HashMap;
use tokio::sync::RwLock;

const MAX_APDU: u16 = 1476;
const VENDOR_ID: u8 = 0;

// Reject reasons.
const REJECT_OTHER: u8 = 0;
const REJECT_INVALID_TAG: u8 = 4;
const REJECT_MISSING_PARAMETER: u8 = 5;
const REJECT_TOO_MANY_ARGUMENTS: u8 = 7;
const REJECT_UNRECOGNIZED_SERVICE: u8 = 9;

type ObjectTable = HashMap<ObjectId, HashMap<PropertyId, PropertyValue>>;

/// A simulated BACnet device.
#[derive(Debug)]
pub struct SimulatedDevice<D: DataLink> {
    device_id: ObjectId,
    objects: RwLock<ObjectTable>,
    datalink: D,
}

impl<D: DataLink> SimulatedDevice<D> {
    /// Creates a device object with the given instance and a standard set of
    /// device properties.
    pub fn new(instance: u32, datalink: D) -> Result<Self, ClientError> {
        let device_id = ObjectId::new(ObjectType::Device, instance)?;
        let device_props = HashMap::from([
            (
                PropertyId::ObjectName,
                PropertyValue::from(format!("SimDevice-{instance}")),
            ),
            (PropertyId::VendorName, PropertyValue::from("bacprobe")),
            (
                PropertyId::VendorIdentifier,
                PropertyValue::UnsignedInteger(u32::from(VENDOR_ID)),
            ),
            (PropertyId::ModelName, PropertyValue::from("bacprobe-simulator")),
            (
                PropertyId::FirmwareRevision,
                PropertyValue::from(env!("CARGO_PKG_VERSION")),
            ),
            (
                PropertyId::ApplicationSoftwareVersion,
                PropertyValue::from(env!("CARGO_PKG_VERSION")),
            ),
            (PropertyId::Location, PropertyValue::from("lab")),
            (PropertyId::Description, PropertyValue::from("simulated device")),
            (PropertyId::ProtocolVersion, PropertyValue::UnsignedInteger(1)),
            (PropertyId::ProtocolRevision, PropertyValue::UnsignedInteger(14)),
            (PropertyId::SystemStatus, PropertyValue::UnsignedInteger(0)),
            (
                PropertyId::MaxApduLengthAccepted,
                PropertyValue::UnsignedInteger(u32::from(MAX_APDU)),
            ),
            (
                PropertyId::SegmentationSupported,
                PropertyValue::UnsignedInteger(3),
            ),
            (PropertyId::OutOfService, PropertyValue::Boolean(false)),
        ]);

        Ok(Self {
            device_id,
            objects: RwLock::new(HashMap::from([(device_id, device_props)])),
            datalink,
        })
    }

    pub fn device_id(&self) -> ObjectId {
        self.device_id
    }

    /// Adds (or replaces) an object and its properties.
    pub async fn add_object(
        &self,
        id: ObjectId,
        properties: impl IntoIterator<Item = (PropertyId, PropertyValue)>,
    ) {
        self.objects
            .write()
            .await
            .insert(id, properties.into_iter().collect());
    }

    pub async fn has_object(&self, id: ObjectId) -> bool {
        self.objects.read().await.contains_key(&id)
    }

    pub async fn property(&self, id: ObjectId, property: PropertyId) -> Option<PropertyValue> {
        self.objects
            .read()
            .await
            .get(&id)
            .and_then(|props| props.get(&property))
            .cloned()
    }

    /// Serves requests arriving on `inbound` until the channel closes.
    pub async fn run(&self, mut inbound: Inbound) {
        while let Some((packet, source)) = inbound.recv().await {
            let Some(frame) = framer::decode(&packet) else {
                continue;
            };
            let source = frame.origin.map(DataLinkAddress::Ip).unwrap_or(source);
            if let Err(e) = self.handle_apdu(frame.apdu, source).await {
                log::debug!("simulator: error handling request from {source}: {e}");
            }
        }
    }

    async fn handle_apdu(&self, apdu: &[u8], source: DataLinkAddress) -> Result<(), ClientError> {
        match ApduType::of(apdu) {
            Some(ApduType::UnconfirmedRequest) => {
                // Only Who-Is decodes as an unconfirmed request.
                if let Ok(ServiceRequest::WhoIs { low, high }) = decode_request(apdu) {
                    if (low..=high).contains(&self.device_id.instance()) {
                        self.send_i_am(source).await?;
                    }
                }
                Ok(())
            }
            Some(ApduType::ConfirmedRequest) => {
                let Ok(header) = ConfirmedRequestHeader::decode(&mut Reader::new(apdu)) else {
                    return Ok(());
                };
                let response = match decode_request(apdu) {
                    Ok(request) => self.serve(header, request).await?,
                    Err(e) => reject(header.invoke_id, reject_reason(e))?,
                };
                let packet = framer::frame_unicast(&response)?;
                self.datalink.send(source, &packet).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn serve(
        &self,
        header: ConfirmedRequestHeader,
        request: ServiceRequest,
    ) -> Result<Vec<u8>, ClientError> {
        let ConfirmedRequestHeader {
            service_choice,
            invoke_id,
        } = header;
        let error = |class: ErrorClass, code: ErrorCode| {
            error_pdu(invoke_id, service_choice, class, code)
        };

        match request {
            ServiceRequest::ReadProperty {
                object, property, ..
            } => {
                let objects = self.objects.read().await;
                let Some(props) = objects.get(&object) else {
                    return error(ErrorClass::Object, ErrorCode::UnknownObject);
                };
                match props.get(&property) {
                    Some(value) => read_ack(invoke_id, object, property, value),
                    None => error(ErrorClass::Property, ErrorCode::UnknownProperty),
                }
            }
            ServiceRequest::WriteProperty {
                object,
                property,
                value,
                ..
            } => {
                let mut objects = self.objects.write().await;
                let Some(props) = objects.get_mut(&object) else {
                    return error(ErrorClass::Object, ErrorCode::UnknownObject);
                };
                props.insert(property, value);
                simple_ack(invoke_id, service_choice)
            }
            ServiceRequest::CreateObject { object, properties } => {
                let mut objects = self.objects.write().await;
                if objects.contains_key(&object) {
                    return error(ErrorClass::Object, ErrorCode::ObjectIdentifierAlreadyExists);
                }
                objects.insert(object, properties.into_iter().collect());
                simple_ack(invoke_id, service_choice)
            }
            ServiceRequest::DeleteObject { object } => {
                if object == self.device_id {
                    return error(ErrorClass::Object, ErrorCode::ObjectDeletionNotPermitted);
                }
                match self.objects.write().await.remove(&object) {
                    Some(_) => simple_ack(invoke_id, service_choice),
                    None => error(ErrorClass::Object, ErrorCode::UnknownObject),
                }
            }
            ServiceRequest::DeviceCommunicationControl { .. }
            | ServiceRequest::ReinitializeDevice { .. }
            | ServiceRequest::AcknowledgeAlarm { .. }
            | ServiceRequest::SubscribeCov { .. } => simple_ack(invoke_id, service_choice),
            ServiceRequest::WhoIs { .. } => reject(invoke_id, REJECT_UNRECOGNIZED_SERVICE),
        }
    }

    async fn send_i_am(&self, target: DataLinkAddress) -> Result<(), ClientError> {
        let mut w = Writer::new();
        IAmRequest {
            device_id: self.device_id,
            max_apdu: MAX_APDU,
            vendor_id: VENDOR_ID,
        }
        .encode(&mut w)?;
        let packet = framer::frame_unicast(w.as_written())?;
        self.datalink.send(target, &packet).await?;
        Ok(())
    }
}

// ReadProperty-ACK: object [0], property [1], value inside opening/closing tag 3.
fn read_ack(
    invoke_id: u8,
    object: ObjectId,
    property: PropertyId,
    value: &PropertyValue,
) -> Result<Vec<u8>, ClientError> {
    let mut w = Writer::new();
    ComplexAckHeader {
        invoke_id,
        service_choice: SERVICE_READ_PROPERTY,
    }
    .encode(&mut w)?;
    w.write_u8(0x0C)?;
    w.write_be_u32(object.raw())?;
    match u8::try_from(property.to_u32()) {
        Ok(code) => {
            w.write_u8(0x19)?;
            w.write_u8(code)?;
        }
        Err(_) => {
            let code = u16::try_from(property.to_u32())
                .map_err(|_| bacprobe_core::EncodeError::ValueOutOfRange)?;
            w.write_u8(0x1A)?;
            w.write_be_u16(code)?;
        }
    }
    w.write_u8(0x3E)?;
    encode_value(&mut w, value)?;
    w.write_u8(0x3F)?;
    Ok(w.into_inner())
}

fn simple_ack(invoke_id: u8, service_choice: u8) -> Result<Vec<u8>, ClientError> {
    let mut w = Writer::new();
    SimpleAck {
        invoke_id,
        service_choice,
    }
    .encode(&mut w)?;
    Ok(w.into_inner())
}

fn error_pdu(
    invoke_id: u8,
    service_choice: u8,
    class: ErrorClass,
    code: ErrorCode,
) -> Result<Vec<u8>, ClientError> {
    let mut w = Writer::new();
    BacnetError {
        invoke_id,
        service_choice,
        error_class: Some(class.to_u32()),
        error_code: Some(code.to_u32()),
    }
    .encode(&mut w)?;
    Ok(w.into_inner())
}

fn reject(invoke_id: u8, reason: u8) -> Result<Vec<u8>, ClientError> {
    let mut w = Writer::new();
    RejectPdu { invoke_id, reason }.encode(&mut w)?;
    Ok(w.into_inner())
}

fn reject_reason(err: DecodeError) -> u8 {
    match err {
        DecodeError::Unsupported => REJECT_UNRECOGNIZED_SERVICE,
        DecodeError::InvalidTag => REJECT_INVALID_TAG,
        DecodeError::UnexpectedEof => REJECT_MISSING_PARAMETER,
        DecodeError::InvalidLength => REJECT_TOO_MANY_ARGUMENTS,
        _ => REJECT_OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedDevice;
    use crate::testing::memory_pair;
    use bacprobe_core::services::ServiceRequest;
    use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
    use bacprobe_datalink::bip::framer;
    use bacprobe_datalink::DataLink;
    use std::time::Duration;
    use tokio::time::timeout;

    fn ai(i: u32) -> ObjectId {
        ObjectId::new(ObjectType::AnalogInput, i).unwrap()
    }

    #[test]
    fn rejects_out_of_range_instance() {
        let ((link, _), _) = memory_pair();
        assert!(SimulatedDevice::new(ObjectId::MAX_INSTANCE + 1, link).is_err());
    }

    #[tokio::test]
    async fn answers_read_with_echoed_ack() {
        let ((client_link, mut client_rx), (sim_link, sim_rx)) = memory_pair();
        let sim = SimulatedDevice::new(1234, sim_link).unwrap();
        sim.add_object(ai(1), [(PropertyId::PresentValue, PropertyValue::Real(21.5))])
            .await;

        let request = ServiceRequest::read_property(ai(1), PropertyId::PresentValue)
            .encode(7)
            .unwrap();
        client_link
            .send(client_link.peer(), &framer::frame_unicast(&request).unwrap())
            .await
            .unwrap();
        drop(client_link);

        let serve = sim.run(sim_rx);
        let (_, reply) = tokio::join!(serve, async {
            timeout(Duration::from_secs(1), client_rx.recv()).await.unwrap()
        });
        let (packet, _) = reply.unwrap();
        let apdu = framer::unframe(&packet).unwrap();
        let mut expected = vec![0x30, 0x07, 0x0C, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x44];
        expected.extend_from_slice(&21.5f32.to_be_bytes());
        expected.push(0x3F);
        assert_eq!(apdu, &expected[..]);
    }

    #[tokio::test]
    async fn unknown_property_is_an_error_pdu() {
        let ((client_link, mut client_rx), (sim_link, sim_rx)) = memory_pair();
        let sim = SimulatedDevice::new(10, sim_link).unwrap();

        let request = ServiceRequest::read_property(sim.device_id(), PropertyId::Units)
            .encode(3)
            .unwrap();
        client_link
            .send(client_link.peer(), &framer::frame_unicast(&request).unwrap())
            .await
            .unwrap();
        drop(client_link);

        let (_, reply) = tokio::join!(sim.run(sim_rx), client_rx.recv());
        let (packet, _) = reply.unwrap();
        assert_eq!(
            framer::unframe(&packet).unwrap(),
            &[0x50, 0x03, 0x0C, 0x91, 0x02, 0x91, 0x20]
        );
    }

    #[tokio::test]
    async fn who_is_outside_range_is_ignored() {
        let ((client_link, mut client_rx), (sim_link, sim_rx)) = memory_pair();
        let sim = SimulatedDevice::new(50, sim_link).unwrap();

        for (low, high) in [(1, 10), (40, 60)] {
            let who_is = ServiceRequest::WhoIs { low, high }.encode(0).unwrap();
            client_link
                .send_broadcast(&framer::frame_broadcast(&who_is).unwrap())
                .await
                .unwrap();
        }
        drop(client_link);

        sim.run(sim_rx).await;
        let (packet, _) = client_rx.recv().await.unwrap();
        let apdu = framer::unframe(&packet).unwrap();
        assert_eq!(
            bacprobe_core::services::i_am::device_id(apdu),
            Some(sim.device_id())
        );
        assert!(client_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn create_and_delete_update_the_table() {
        let ((client_link, mut client_rx), (sim_link, sim_rx)) = memory_pair();
        let sim = SimulatedDevice::new(10, sim_link).unwrap();
        let av = ObjectId::new(ObjectType::AnalogValue, 4).unwrap();

        let requests = [
            ServiceRequest::CreateObject {
                object: av,
                properties: vec![(PropertyId::ObjectName, "Setpoint".into())],
            },
            ServiceRequest::DeleteObject {
                object: sim.device_id(),
            },
        ];
        for (i, request) in requests.iter().enumerate() {
            let apdu = request.encode(i as u8 + 1).unwrap();
            client_link
                .send(client_link.peer(), &framer::frame_unicast(&apdu).unwrap())
                .await
                .unwrap();
        }
        drop(client_link);
        sim.run(sim_rx).await;

        let (created, _) = client_rx.recv().await.unwrap();
        assert_eq!(framer::unframe(&created).unwrap(), &[0x20, 0x01, 0x0A]);
        let (refused, _) = client_rx.recv().await.unwrap();
        assert_eq!(
            framer::unframe(&refused).unwrap(),
            &[0x50, 0x02, 0x0B, 0x91, 0x01, 0x91, 0x17]
        );
        assert_eq!(
            sim.property(av, PropertyId::ObjectName).await,
            Some(PropertyValue::from("Setpoint"))
        );
        assert!(sim.has_object(sim.device_id()).await);
    }
}
