use crate::apdu::{ApduType, ConfirmedRequestHeader, UnconfirmedRequestHeader};
use crate::encoding::{reader::Reader, tag, writer::Writer};
use crate::services::device_management::{
    ReinitializeKind, SERVICE_DEVICE_COMMUNICATION_CONTROL, SERVICE_REINITIALIZE_DEVICE,
};
use crate::services::value_codec::{
    encode_character_string, encode_object_id, encode_value, read_character_string,
    read_object_id, read_value,
};
use crate::services::{
    SERVICE_ACKNOWLEDGE_ALARM, SERVICE_CREATE_OBJECT, SERVICE_DELETE_OBJECT,
    SERVICE_READ_PROPERTY, SERVICE_SUBSCRIBE_COV, SERVICE_WHO_IS, SERVICE_WRITE_PROPERTY,
};
use crate::types::{ObjectId, PropertyId, PropertyValue};
use crate::{DecodeError, EncodeError};

/// Highest device instance a Who-Is range can name.
pub const WHO_IS_MAX: u32 = ObjectId::MAX_INSTANCE;

/// Lowest and highest valid write priority.
pub const PRIORITY_RANGE: core::ops::RangeInclusive<u8> = 1..=16;

/// Lowest (and default) command priority.
pub const DEFAULT_PRIORITY: u8 = 16;

/// An outbound service request in the supported subset.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    WhoIs {
        low: u32,
        high: u32,
    },
    ReadProperty {
        object: ObjectId,
        property: PropertyId,
        array_index: Option<u32>,
    },
    WriteProperty {
        object: ObjectId,
        property: PropertyId,
        value: PropertyValue,
        priority: Option<u8>,
        array_index: Option<u32>,
    },
    DeviceCommunicationControl {
        object: ObjectId,
        command: String,
        arguments: Vec<String>,
    },
    ReinitializeDevice {
        kind: ReinitializeKind,
    },
    AcknowledgeAlarm {
        object: ObjectId,
        action: String,
    },
    CreateObject {
        object: ObjectId,
        properties: Vec<(PropertyId, PropertyValue)>,
    },
    DeleteObject {
        object: ObjectId,
    },
    SubscribeCov {
        object: ObjectId,
        property: PropertyId,
    },
}

/// One encodable element of a request body.
#[derive(Debug, Clone, Copy)]
enum Field<'a> {
    Object(ObjectId),
    Property(PropertyId),
    ArrayIndex(u32),
    Priority(u8),
    Value(&'a PropertyValue),
    Text(&'a str),
    Flag(u8),
    WhoIsLimits(u32, u32),
}

impl Field<'_> {
    fn encode(self, w: &mut Writer) -> Result<(), EncodeError> {
        match self {
            Self::Object(id) => encode_object_id(w, id),
            Self::Property(property) => {
                let code = u16::try_from(property.to_u32())
                    .map_err(|_| EncodeError::ValueOutOfRange)?;
                w.write_u8(tag::PROPERTY_ID)?;
                w.write_u8(tag::PROPERTY_ID_LEN)?;
                w.write_be_u16(code)
            }
            Self::ArrayIndex(index) => {
                let index = u16::try_from(index).map_err(|_| EncodeError::ValueOutOfRange)?;
                w.write_u8(tag::ARRAY_INDEX)?;
                w.write_u8(tag::ARRAY_INDEX_LEN)?;
                w.write_be_u16(index)
            }
            Self::Priority(p) => {
                if !PRIORITY_RANGE.contains(&p) {
                    return Err(EncodeError::InvalidPriority(p));
                }
                w.write_u8(tag::PRIORITY)?;
                w.write_u8(p)
            }
            Self::Value(value) => encode_value(w, value),
            Self::Text(s) => encode_character_string(w, s),
            Self::Flag(v) => {
                w.write_u8(tag::BOOLEAN)?;
                w.write_u8(v)
            }
            Self::WhoIsLimits(low, high) => {
                w.write_u8(tag::WHO_IS_LOW)?;
                w.write_be_u32(low)?;
                w.write_u8(tag::WHO_IS_HIGH)?;
                w.write_be_u32(high)
            }
        }
    }
}

impl ServiceRequest {
    /// Who-Is addressed to every device.
    pub const fn who_is_all() -> Self {
        Self::WhoIs {
            low: 0,
            high: WHO_IS_MAX,
        }
    }

    pub const fn read_property(object: ObjectId, property: PropertyId) -> Self {
        Self::ReadProperty {
            object,
            property,
            array_index: None,
        }
    }

    pub fn write_property(
        object: ObjectId,
        property: PropertyId,
        value: impl Into<PropertyValue>,
        priority: Option<u8>,
    ) -> Self {
        Self::WriteProperty {
            object,
            property,
            value: value.into(),
            priority,
            array_index: None,
        }
    }

    pub const fn service_choice(&self) -> u8 {
        match self {
            Self::WhoIs { .. } => SERVICE_WHO_IS,
            Self::ReadProperty { .. } => SERVICE_READ_PROPERTY,
            Self::WriteProperty { .. } => SERVICE_WRITE_PROPERTY,
            Self::DeviceCommunicationControl { .. } => SERVICE_DEVICE_COMMUNICATION_CONTROL,
            Self::ReinitializeDevice { .. } => SERVICE_REINITIALIZE_DEVICE,
            Self::AcknowledgeAlarm { .. } => SERVICE_ACKNOWLEDGE_ALARM,
            Self::CreateObject { .. } => SERVICE_CREATE_OBJECT,
            Self::DeleteObject { .. } => SERVICE_DELETE_OBJECT,
            Self::SubscribeCov { .. } => SERVICE_SUBSCRIBE_COV,
        }
    }

    /// Whether the request expects a response carrying its invoke id.
    pub const fn is_confirmed(&self) -> bool {
        !matches!(self, Self::WhoIs { .. })
    }

    /// Human-readable service name, used in log lines.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WhoIs { .. } => "who-is",
            Self::ReadProperty { .. } => "read-property",
            Self::WriteProperty { .. } => "write-property",
            Self::DeviceCommunicationControl { .. } => "device-communication-control",
            Self::ReinitializeDevice { .. } => "reinitialize-device",
            Self::AcknowledgeAlarm { .. } => "acknowledge-alarm",
            Self::CreateObject { .. } => "create-object",
            Self::DeleteObject { .. } => "delete-object",
            Self::SubscribeCov { .. } => "subscribe-cov",
        }
    }

    fn fields(&self) -> Result<Vec<Field<'_>>, EncodeError> {
        let fields = match self {
            Self::WhoIs { low, high } => {
                if (*low, *high) == (0, WHO_IS_MAX) {
                    Vec::new()
                } else if low > high || *high > WHO_IS_MAX {
                    return Err(EncodeError::InvalidWhoIsRange {
                        low: *low,
                        high: *high,
                    });
                } else {
                    vec![Field::WhoIsLimits(*low, *high)]
                }
            }
            Self::ReadProperty {
                object,
                property,
                array_index,
            } => {
                let mut f = vec![Field::Object(*object), Field::Property(*property)];
                f.extend(array_index.map(Field::ArrayIndex));
                f
            }
            Self::WriteProperty {
                object,
                property,
                value,
                priority,
                array_index,
            } => {
                let mut f = vec![Field::Object(*object), Field::Property(*property)];
                f.extend(array_index.map(Field::ArrayIndex));
                f.extend(priority.map(Field::Priority));
                f.push(Field::Value(value));
                f
            }
            Self::DeviceCommunicationControl {
                object,
                command,
                arguments,
            } => {
                let mut f = vec![Field::Object(*object), Field::Text(command)];
                f.extend(arguments.iter().map(|a| Field::Text(a)));
                f
            }
            Self::ReinitializeDevice { kind } => vec![Field::Flag(kind.to_u8())],
            Self::AcknowledgeAlarm { object, action } => {
                vec![Field::Object(*object), Field::Text(action)]
            }
            Self::CreateObject { object, properties } => {
                let mut f = vec![Field::Object(*object)];
                for (property, value) in properties {
                    f.push(Field::Property(*property));
                    f.push(Field::Value(value));
                }
                f
            }
            Self::DeleteObject { object } => vec![Field::Object(*object)],
            Self::SubscribeCov { object, property } => vec![
                Field::Object(*object),
                Field::Property(*property),
                Field::Flag(1),
            ],
        };
        Ok(fields)
    }

    /// Encodes the complete APDU. `invoke_id` is ignored for unconfirmed
    /// services.
    pub fn encode(&self, invoke_id: u8) -> Result<Vec<u8>, EncodeError> {
        let fields = self.fields()?;
        let mut w = Writer::new();
        if self.is_confirmed() {
            ConfirmedRequestHeader {
                service_choice: self.service_choice(),
                invoke_id,
            }
            .encode(&mut w)?;
        } else {
            UnconfirmedRequestHeader {
                service_choice: self.service_choice(),
            }
            .encode(&mut w)?;
        }
        for field in fields {
            field.encode(&mut w)?;
        }
        Ok(w.into_inner())
    }
}

/// Parses an APDU produced by [`ServiceRequest::encode`].
///
/// Trailing bytes after a complete body are rejected with
/// [`DecodeError::InvalidLength`].
pub fn decode_request(apdu: &[u8]) -> Result<ServiceRequest, DecodeError> {
    let mut r = Reader::new(apdu);
    let request = match ApduType::of(apdu) {
        Some(ApduType::UnconfirmedRequest) => {
            let header = UnconfirmedRequestHeader::decode(&mut r)?;
            if header.service_choice != SERVICE_WHO_IS {
                return Err(DecodeError::Unsupported);
            }
            decode_who_is(&mut r)?
        }
        Some(ApduType::ConfirmedRequest) => {
            let header = ConfirmedRequestHeader::decode(&mut r)?;
            decode_confirmed_body(header.service_choice, &mut r)?
        }
        _ => return Err(DecodeError::InvalidValue),
    };
    if !r.is_empty() {
        return Err(DecodeError::InvalidLength);
    }
    Ok(request)
}

fn decode_who_is(r: &mut Reader<'_>) -> Result<ServiceRequest, DecodeError> {
    if r.is_empty() {
        return Ok(ServiceRequest::who_is_all());
    }
    r.expect_u8(tag::WHO_IS_LOW)?;
    let low = r.read_be_u32()?;
    r.expect_u8(tag::WHO_IS_HIGH)?;
    let high = r.read_be_u32()?;
    Ok(ServiceRequest::WhoIs { low, high })
}

fn decode_confirmed_body(
    service_choice: u8,
    r: &mut Reader<'_>,
) -> Result<ServiceRequest, DecodeError> {
    let request = match service_choice {
        SERVICE_READ_PROPERTY => ServiceRequest::ReadProperty {
            object: read_object_id(r)?,
            property: read_property_id(r)?,
            array_index: read_optional_array_index(r)?,
        },
        SERVICE_WRITE_PROPERTY => {
            let object = read_object_id(r)?;
            let property = read_property_id(r)?;
            let array_index = read_optional_array_index(r)?;
            let priority = if r.peek_u8()? == tag::PRIORITY {
                r.skip(1)?;
                let p = r.read_u8()?;
                if !PRIORITY_RANGE.contains(&p) {
                    return Err(DecodeError::InvalidValue);
                }
                Some(p)
            } else {
                None
            };
            ServiceRequest::WriteProperty {
                object,
                property,
                value: read_value(r)?,
                priority,
                array_index,
            }
        }
        SERVICE_DEVICE_COMMUNICATION_CONTROL => {
            let object = read_object_id(r)?;
            r.expect_u8(tag::CHARACTER_STRING)?;
            let command = read_character_string(r)?;
            let mut arguments = Vec::new();
            while !r.is_empty() {
                r.expect_u8(tag::CHARACTER_STRING)?;
                arguments.push(read_character_string(r)?);
            }
            ServiceRequest::DeviceCommunicationControl {
                object,
                command,
                arguments,
            }
        }
        SERVICE_REINITIALIZE_DEVICE => {
            r.expect_u8(tag::BOOLEAN)?;
            let kind = ReinitializeKind::from_u8(r.read_u8()?).ok_or(DecodeError::InvalidValue)?;
            ServiceRequest::ReinitializeDevice { kind }
        }
        SERVICE_ACKNOWLEDGE_ALARM => {
            let object = read_object_id(r)?;
            r.expect_u8(tag::CHARACTER_STRING)?;
            ServiceRequest::AcknowledgeAlarm {
                object,
                action: read_character_string(r)?,
            }
        }
        SERVICE_CREATE_OBJECT => {
            let object = read_object_id(r)?;
            let mut properties = Vec::new();
            while !r.is_empty() {
                let property = read_property_id(r)?;
                properties.push((property, read_value(r)?));
            }
            ServiceRequest::CreateObject { object, properties }
        }
        SERVICE_DELETE_OBJECT => ServiceRequest::DeleteObject {
            object: read_object_id(r)?,
        },
        SERVICE_SUBSCRIBE_COV => {
            let object = read_object_id(r)?;
            let property = read_property_id(r)?;
            r.expect_u8(tag::BOOLEAN)?;
            r.expect_u8(0x01)?;
            ServiceRequest::SubscribeCov { object, property }
        }
        _ => return Err(DecodeError::Unsupported),
    };
    Ok(request)
}

fn read_property_id(r: &mut Reader<'_>) -> Result<PropertyId, DecodeError> {
    r.expect_u8(tag::PROPERTY_ID)?;
    if r.read_u8()? != tag::PROPERTY_ID_LEN {
        return Err(DecodeError::InvalidLength);
    }
    Ok(PropertyId::from_u32(u32::from(r.read_be_u16()?)))
}

fn read_optional_array_index(r: &mut Reader<'_>) -> Result<Option<u32>, DecodeError> {
    if r.peek_u8().ok() != Some(tag::ARRAY_INDEX) {
        return Ok(None);
    }
    r.skip(1)?;
    if r.read_u8()? != tag::ARRAY_INDEX_LEN {
        return Err(DecodeError::InvalidLength);
    }
    Ok(Some(u32::from(r.read_be_u16()?)))
}
