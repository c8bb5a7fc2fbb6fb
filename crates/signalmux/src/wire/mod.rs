// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The binary wire format (§4.2, §6.1, §6.2): frame/unframe records,
//! convert between the domain [`crate::message::Message`] and its
//! protobuf wire representation, and (optionally) sign/verify records
//! with HMAC.
//!
//! Hand-derives `prost::Message` structs (`proto.rs`) rather than
//! generating them from a `.proto` file — see that module's doc comment
//! for why, grounded on `estuary-flow`'s direct `prost::Message` usage.

mod convert;
mod error;
mod frame;
#[cfg(feature = "hmac-signing")]
mod hmac_sign;
mod proto;

pub use convert::{message_to_proto, proto_to_message};
pub use error::WireError;
pub use frame::{
    decode_header, encode_message_record, encode_record, max_record_size, Header, HeaderDecode, HmacHashFunction,
    Record, RecordReader, DEFAULT_MAX_MESSAGE_SIZE, MAX_HEADER_SIZE, RECORD_SEPARATOR, UNIT_SEPARATOR,
};
#[cfg(feature = "hmac-signing")]
pub use hmac_sign::{Signer, Verifier};
pub use proto::{FieldProto, HeaderProto, HmacHashFunctionProto, MessageProto, ValueTypeProto};
