// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire-format structs for the three protobuf messages in §6.2 of the
//! specification. These are hand-derived directly from `prost::Message`
//! rather than generated from a `.proto` file via `prost-build` + `protoc`
//! — the schema is small, fixed, and field numbers are pinned by spec, so
//! a build-time codegen step buys nothing `#[prost(..., tag = "N")]`
//! attributes don't already give us directly (the same pattern
//! `estuary-flow`'s `crates/bindings` and `crates/cgo` use `prost::Message`
//! for, minus the `.proto` front-end).
//!
//! Field numbers are part of the wire contract and must never be
//! renumbered; gaps (e.g. `Header`'s missing field 2) are preserved
//! deliberately for historical compatibility, not typos.

/// `valueType` enum per §6.2's `Field` schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ::prost::Enumeration)]
#[repr(i32)]
pub enum ValueTypeProto {
    String = 0,
    Bytes = 1,
    Integer = 2,
    Double = 3,
    Bool = 4,
}

/// `hmacHashFunction` enum per §6.2's `Header` schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ::prost::Enumeration)]
#[repr(i32)]
pub enum HmacHashFunctionProto {
    Md5 = 0,
    Sha1 = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "ValueTypeProto", tag = "2")]
    pub value_type: i32,
    #[prost(string, tag = "3")]
    pub representation: String,
    #[prost(string, repeated, tag = "4")]
    pub value_string: Vec<String>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub value_bytes: Vec<Vec<u8>>,
    #[prost(int64, repeated, tag = "6")]
    pub value_integer: Vec<i64>,
    #[prost(double, repeated, tag = "7")]
    pub value_double: Vec<f64>,
    #[prost(bool, repeated, tag = "8")]
    pub value_bool: Vec<bool>,
}

/// `type`/`logger`/`payload`/`envVersion`/`hostname`/`severity`/`pid` use
/// proto3 `optional` (presence-tracked) fields rather than bare scalars:
/// §3.1 calls every one of them "optional/nullable" on the domain
/// [`super::super::message::Message`], and a bare scalar can't distinguish
/// "absent" from "zero"/"empty string" on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageProto {
    #[prost(bytes = "vec", tag = "1")]
    pub uuid: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(string, optional, tag = "3")]
    pub r#type: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub logger: Option<String>,
    #[prost(int32, optional, tag = "5")]
    pub severity: Option<i32>,
    #[prost(string, optional, tag = "6")]
    pub payload: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub env_version: Option<String>,
    #[prost(int32, optional, tag = "8")]
    pub pid: Option<i32>,
    #[prost(string, optional, tag = "9")]
    pub hostname: Option<String>,
    #[prost(message, repeated, tag = "10")]
    pub fields: Vec<FieldProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderProto {
    #[prost(uint32, tag = "1")]
    pub message_length: u32,
    // field 2 intentionally unused; preserved from the historical schema.
    #[prost(enumeration = "HmacHashFunctionProto", optional, tag = "3")]
    pub hmac_hash_function: Option<i32>,
    #[prost(string, tag = "4")]
    pub hmac_signer: String,
    #[prost(uint32, tag = "5")]
    pub hmac_key_version: u32,
    #[prost(bytes = "vec", tag = "6")]
    pub hmac: Vec<u8>,
}
