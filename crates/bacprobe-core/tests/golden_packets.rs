use bacprobe_core::apdu::{BacnetError, ComplexAckHeader, SimpleAck};
use bacprobe_core::encoding::{reader::Reader, writer::Writer};
use bacprobe_core::npdu::Npdu;
use bacprobe_core::services::value_codec::decode_value;
use bacprobe_core::services::{decode_request, ReinitializeKind, ServiceRequest};
use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};

fn oid(t: ObjectType, i: u32) -> ObjectId {
    ObjectId::new(t, i).unwrap()
}

#[test]
fn who_is_global_frame_matches_fixture() {
    let mut w = Writer::new();
    Npdu::LOCAL.encode(&mut w).unwrap();
    w.write_all(&ServiceRequest::who_is_all().encode(0).unwrap())
        .unwrap();
    assert_eq!(w.as_written(), &[0x01, 0x00, 0x10, 0x08]);
}

#[test]
fn read_property_matches_fixture() {
    let apdu = ServiceRequest::read_property(oid(ObjectType::AnalogInput, 1), PropertyId::PresentValue)
        .encode(1)
        .unwrap();
    assert_eq!(
        apdu,
        [0x00, 0x0C, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x01, 0x02, 0x00, 0x55]
    );
}

#[test]
fn read_device_object_name_matches_fixture() {
    let apdu = ServiceRequest::read_property(oid(ObjectType::Device, 123), PropertyId::ObjectName)
        .encode(2)
        .unwrap();
    assert_eq!(
        apdu,
        [0x00, 0x0C, 0x02, 0x00, 0x04, 0x02, 0x00, 0x00, 0x7B, 0x01, 0x02, 0x00, 0x4D]
    );
}

#[test]
fn write_out_of_service_matches_fixture() {
    let apdu = ServiceRequest::write_property(
        oid(ObjectType::BinaryValue, 3),
        PropertyId::OutOfService,
        true,
        None,
    )
    .encode(0x20)
    .unwrap();
    assert_eq!(
        apdu,
        [0x00, 0x0F, 0x20, 0x00, 0x04, 0x01, 0x40, 0x00, 0x03, 0x01, 0x02, 0x00, 0x51, 0x91, 0x01]
    );
}

#[test]
fn write_description_matches_fixture() {
    let apdu = ServiceRequest::write_property(
        oid(ObjectType::AnalogValue, 2),
        PropertyId::Description,
        "Test Write",
        Some(16),
    )
    .encode(3)
    .unwrap();
    let mut expected = vec![
        0x00, 0x0F, 0x03, 0x00, 0x04, 0x00, 0x80, 0x00, 0x02, 0x01, 0x02, 0x00, 0x1C, 0x87, 0x10,
        0x75, 0x0A,
    ];
    expected.extend_from_slice(b"Test Write");
    assert_eq!(apdu, expected);
}

#[test]
fn dcc_backup_matches_fixture() {
    let apdu = ServiceRequest::DeviceCommunicationControl {
        object: oid(ObjectType::Device, 1),
        command: "backup".into(),
        arguments: Vec::new(),
    }
    .encode(5)
    .unwrap();
    let mut expected = vec![0x00, 0x11, 0x05, 0x00, 0x04, 0x02, 0x00, 0x00, 0x01, 0x75, 0x06];
    expected.extend_from_slice(b"backup");
    assert_eq!(apdu, expected);
}

#[test]
fn reinitialize_coldstart_matches_fixture() {
    let apdu = ServiceRequest::ReinitializeDevice {
        kind: ReinitializeKind::Coldstart,
    }
    .encode(6)
    .unwrap();
    assert_eq!(apdu, [0x00, 0x14, 0x06, 0x91, 0x00]);
}

#[test]
fn create_object_matches_fixture() {
    let apdu = ServiceRequest::CreateObject {
        object: oid(ObjectType::AnalogValue, 10),
        properties: vec![(PropertyId::PresentValue, PropertyValue::Real(1.5))],
    }
    .encode(7)
    .unwrap();
    assert_eq!(
        apdu,
        [
            0x00, 0x0A, 0x07, 0x00, 0x04, 0x00, 0x80, 0x00, 0x0A, 0x01, 0x02, 0x00, 0x55, 0x44,
            0x3F, 0xC0, 0x00, 0x00,
        ]
    );
    assert!(matches!(
        decode_request(&apdu).unwrap(),
        ServiceRequest::CreateObject { properties, .. } if properties.len() == 1
    ));
}

#[test]
fn delete_and_ack_alarm_match_fixture() {
    let apdu = ServiceRequest::DeleteObject {
        object: oid(ObjectType::AnalogValue, 10),
    }
    .encode(8)
    .unwrap();
    assert_eq!(apdu, [0x00, 0x0B, 0x08, 0x00, 0x04, 0x00, 0x80, 0x00, 0x0A]);

    let apdu = ServiceRequest::AcknowledgeAlarm {
        object: oid(ObjectType::AnalogInput, 4),
        action: "acknowledge".into(),
    }
    .encode(9)
    .unwrap();
    assert_eq!(&apdu[..9], &[0x00, 0x00, 0x09, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04]);
    assert_eq!(&apdu[9..11], &[0x75, 0x0B]);
    assert_eq!(&apdu[11..], b"acknowledge");
}

#[test]
fn complex_ack_value_scan() {
    let mut w = Writer::new();
    ComplexAckHeader {
        invoke_id: 1,
        service_choice: 0x0C,
    }
    .encode(&mut w)
    .unwrap();
    w.write_all(&[0x0C, 0x02, 0x00, 0x00, 0x7B, 0x19, 0x4D, 0x3E, 0x75, 0x05])
        .unwrap();
    w.write_all(b"Hello").unwrap();
    w.write_u8(0x3F).unwrap();
    let apdu = w.into_inner();
    assert_eq!(
        decode_value(&apdu[ComplexAckHeader::LEN..]),
        PropertyValue::CharacterString("Hello".into())
    );
    assert_eq!(
        decode_value(&[0x21, 0x02, 0x00, 0x00, 0x00, 0x2A]),
        PropertyValue::UnsignedInteger(42)
    );
}

#[test]
fn simple_ack_and_error_fixtures() {
    let mut r = Reader::new(&[0x20, 0x11, 0x0F]);
    assert_eq!(
        SimpleAck::decode(&mut r).unwrap(),
        SimpleAck {
            invoke_id: 0x11,
            service_choice: 0x0F
        }
    );

    let mut r = Reader::new(&[0x50, 0x02, 0x0C, 0x91, 0x01, 0x91, 0x1F]);
    let err = BacnetError::decode(&mut r).unwrap();
    assert_eq!(err.invoke_id, 2);
    assert_eq!(err.error_class, Some(1));
    assert_eq!(err.error_code, Some(31));
}
