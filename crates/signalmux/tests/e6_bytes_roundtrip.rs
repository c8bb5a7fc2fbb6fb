// SPDX-License-Identifier: Apache-2.0 OR MIT

//! E6: a message with a null-terminator-sensitive bytes field survives a
//! full protobuf round-trip byte-identical.

use signalmux::message::{Field, Message};
use signalmux::wire::{message_to_proto, proto_to_message, MessageProto};
use prost::Message as _;

#[test]
fn bytes_field_with_embedded_low_byte_survives_round_trip() {
    let mut original = Message::with_uuid(vec![6u8; 16]).unwrap();
    original.add_field(Field::new("raw", vec![0x61u8, 0x62], "B"));

    let encoded = message_to_proto(&original).encode_to_vec();
    let decoded_proto = MessageProto::decode(encoded.as_slice()).unwrap();
    let decoded = proto_to_message(decoded_proto).unwrap();

    assert_eq!(original, decoded);
}
