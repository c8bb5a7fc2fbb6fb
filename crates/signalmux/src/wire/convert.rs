// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between the domain [`Message`]/[`Field`] types and their
//! protobuf wire representation (§6.2).

use super::error::WireError;
use super::proto::{FieldProto, MessageProto, ValueTypeProto};
use crate::message::{Field, FieldValue, Message, ValueType};

pub fn message_to_proto(msg: &Message) -> MessageProto {
    MessageProto {
        uuid: msg.uuid.bytes().to_vec(),
        timestamp: msg.timestamp,
        r#type: msg.message_type.clone(),
        logger: msg.logger.clone(),
        severity: msg.severity,
        payload: msg.payload.clone(),
        env_version: msg.env_version.clone(),
        pid: msg.pid,
        hostname: msg.hostname.clone(),
        fields: msg.fields().iter().map(field_to_proto).collect(),
    }
}

pub fn proto_to_message(proto: MessageProto) -> Result<Message, WireError> {
    let mut msg = Message::with_uuid(proto.uuid).map_err(|e| WireError::InvalidUuid(e.0))?;
    msg.timestamp = proto.timestamp;
    msg.message_type = proto.r#type;
    msg.logger = proto.logger;
    msg.severity = proto.severity;
    msg.payload = proto.payload;
    msg.env_version = proto.env_version;
    msg.pid = proto.pid;
    msg.hostname = proto.hostname;
    for field_proto in proto.fields {
        msg.add_field(proto_to_field(field_proto)?);
    }
    Ok(msg)
}

fn field_to_proto(field: &Field) -> FieldProto {
    let mut proto = FieldProto {
        name: field.name().to_string(),
        value_type: value_type_to_proto(field.value_type()) as i32,
        representation: field.representation().to_string(),
        value_string: Vec::new(),
        value_bytes: Vec::new(),
        value_integer: Vec::new(),
        value_double: Vec::new(),
        value_bool: Vec::new(),
    };
    for value in field.values() {
        match value {
            FieldValue::String(s) => proto.value_string.push(s),
            FieldValue::Bytes(b) => proto.value_bytes.push(b),
            FieldValue::Integer(n) => proto.value_integer.push(n),
            FieldValue::Double(d) => proto.value_double.push(d),
            FieldValue::Bool(b) => proto.value_bool.push(b),
        }
    }
    proto
}

fn proto_to_field(proto: FieldProto) -> Result<Field, WireError> {
    let value_type = value_type_from_proto(proto.value_type)?;
    let values: Vec<FieldValue> = match value_type {
        ValueType::String => proto.value_string.into_iter().map(FieldValue::String).collect(),
        ValueType::Bytes => proto.value_bytes.into_iter().map(FieldValue::Bytes).collect(),
        ValueType::Integer => proto.value_integer.into_iter().map(FieldValue::Integer).collect(),
        ValueType::Double => proto.value_double.into_iter().map(FieldValue::Double).collect(),
        ValueType::Bool => proto.value_bool.into_iter().map(FieldValue::Bool).collect(),
    };
    Field::new_multi(proto.name.clone(), values, proto.representation).ok_or(WireError::EmptyFieldValues(proto.name))
}

fn value_type_to_proto(vt: ValueType) -> ValueTypeProto {
    match vt {
        ValueType::String => ValueTypeProto::String,
        ValueType::Bytes => ValueTypeProto::Bytes,
        ValueType::Integer => ValueTypeProto::Integer,
        ValueType::Double => ValueTypeProto::Double,
        ValueType::Bool => ValueTypeProto::Bool,
    }
}

fn value_type_from_proto(raw: i32) -> Result<ValueType, WireError> {
    match raw {
        0 => Ok(ValueType::String),
        1 => Ok(ValueType::Bytes),
        2 => Ok(ValueType::Integer),
        3 => Ok(ValueType::Double),
        4 => Ok(ValueType::Bool),
        other => Err(WireError::UnknownValueType(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    fn sample() -> Message {
        let mut m = Message::with_uuid(vec![0xabu8; 16]).unwrap();
        m.timestamp = 1_700_000_000_000_000_000;
        m.message_type = Some("TEST".into());
        m.severity = Some(6);
        m.payload = Some("Test Payload".into());
        m.add_field(Field::new("bytes", vec![0x61u8, 0x62], ""));
        m.add_field(Field::new_multi("int", vec![999i64.into(), 1024i64.into()], "").unwrap());
        m
    }

    #[test]
    fn round_trips_through_protobuf_bytes() {
        let original = sample();
        let proto = message_to_proto(&original);
        let bytes = proto.encode_to_vec();
        let decoded_proto = MessageProto::decode(bytes.as_slice()).unwrap();
        let decoded = proto_to_message(decoded_proto).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn bytes_field_survives_byte_identical() {
        let original = sample();
        let proto = message_to_proto(&original);
        let bytes = proto.encode_to_vec();
        let decoded = proto_to_message(MessageProto::decode(bytes.as_slice()).unwrap()).unwrap();
        assert_eq!(
            decoded.find_first_field("bytes").unwrap().first_value(),
            Some(FieldValue::Bytes(vec![0x61, 0x62]))
        );
    }
}
