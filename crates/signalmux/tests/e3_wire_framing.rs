// SPDX-License-Identifier: Apache-2.0 OR MIT

//! E3: record framing resynchronizes on a truncated trailing unit
//! separator rather than raising an error, and a full record round-trips
//! through the reader.

use signalmux::wire::{decode_header, message_to_proto, HeaderDecode, HeaderProto, RecordReader, DEFAULT_MAX_MESSAGE_SIZE};
use signalmux::message::Message;
use signalmux::wire::encode_message_record;
use prost::Message as _;

#[test]
fn truncated_unit_separator_resyncs_without_error() {
    let header_proto = HeaderProto { message_length: 3, ..Default::default() };
    let mut header_bytes = header_proto.encode_to_vec();
    header_bytes.push(b'X'); // not the unit separator
    match decode_header(&header_bytes, DEFAULT_MAX_MESSAGE_SIZE).unwrap() {
        HeaderDecode::Resync => {}
        HeaderDecode::Ready(_) => panic!("expected a resync signal, not a parsed header"),
    }
}

#[test]
fn full_record_round_trips_through_the_reader() {
    let original = Message::with_uuid(vec![3u8; 16]).unwrap();
    let proto = message_to_proto(&original);
    let encoded = encode_message_record(&proto, None, DEFAULT_MAX_MESSAGE_SIZE).unwrap();

    let mut reader = RecordReader::new();
    reader.feed(&encoded);
    let record = reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap().unwrap();
    assert_eq!(record.header.message_length as usize, record.message_bytes.len());
}

#[test]
fn reader_resyncs_past_a_garbage_prefix() {
    let original = Message::with_uuid(vec![4u8; 16]).unwrap();
    let proto = message_to_proto(&original);
    let encoded = encode_message_record(&proto, None, DEFAULT_MAX_MESSAGE_SIZE).unwrap();

    let mut garbage_then_record = vec![0xFFu8; 16];
    garbage_then_record.extend_from_slice(&encoded);

    let mut reader = RecordReader::new();
    reader.feed(&garbage_then_record);
    let record = reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap();
    assert!(record.is_some());
    assert!(reader.garbage_bytes > 0);
}
