// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record framing (§4.2, §6.1): the length-prefixed, separator-delimited
//! envelope that carries a protobuf-encoded header and message over a byte
//! stream, plus optional HMAC signing/verification of the message bytes.

use super::error::WireError;
use super::proto::{HeaderProto, HmacHashFunctionProto, MessageProto};
use prost::Message as _;

/// Marks the start of a record.
pub const RECORD_SEPARATOR: u8 = 0x1E;
/// Separates the header blob from the message blob within a record.
pub const UNIT_SEPARATOR: u8 = 0x1F;
/// The header length byte is unsigned and the header itself must fit in
/// that byte's range.
pub const MAX_HEADER_SIZE: usize = 255;
/// Default `MAX_MESSAGE_SIZE` tunable (§4.2): 64 KiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 64 * 1024;

/// `MAX_RECORD_SIZE = framing(3) + header(<=255) + MAX_MESSAGE_SIZE`.
#[must_use]
pub fn max_record_size(max_message_size: u32) -> usize {
    3 + MAX_HEADER_SIZE + max_message_size as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacHashFunction {
    Md5,
    Sha1,
}

/// The record header: required message length plus optional HMAC signing
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub message_length: u32,
    pub hmac_hash_function: Option<HmacHashFunction>,
    pub hmac_signer: String,
    /// Carried but not interpreted by the verifier beyond reporting (§9.4
    /// design notes) — kept opaque for interoperability.
    pub hmac_key_version: u32,
    pub hmac: Vec<u8>,
}

impl Header {
    fn to_proto(&self) -> HeaderProto {
        HeaderProto {
            message_length: self.message_length,
            hmac_hash_function: self.hmac_hash_function.map(|h| match h {
                HmacHashFunction::Md5 => HmacHashFunctionProto::Md5 as i32,
                HmacHashFunction::Sha1 => HmacHashFunctionProto::Sha1 as i32,
            }),
            hmac_signer: self.hmac_signer.clone(),
            hmac_key_version: self.hmac_key_version,
            hmac: self.hmac.clone(),
        }
    }

    fn from_proto(proto: HeaderProto) -> Result<Self, WireError> {
        let hmac_hash_function = proto
            .hmac_hash_function
            .map(|raw| match raw {
                0 => Ok(HmacHashFunction::Md5),
                1 => Ok(HmacHashFunction::Sha1),
                other => Err(WireError::UnknownHmacHashFunction(other)),
            })
            .transpose()?;
        Ok(Self {
            message_length: proto.message_length,
            hmac_hash_function,
            hmac_signer: proto.hmac_signer,
            hmac_key_version: proto.hmac_key_version,
            hmac: proto.hmac,
        })
    }
}

/// Outcome of [`decode_header`]: either the header parsed cleanly, or the
/// caller must resynchronize (scan forward for the next record separator)
/// because the buffer wasn't framed the way it expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDecode {
    Ready(Header),
    /// `buf`'s last byte was not [`UNIT_SEPARATOR`] — not an error, the
    /// caller resynchronizes.
    Resync,
}

/// Decode a header from `buf`, which must be the header's protobuf bytes
/// followed by the trailing [`UNIT_SEPARATOR`] byte (§4.2's decode
/// contract).
pub fn decode_header(buf: &[u8], max_message_size: u32) -> Result<HeaderDecode, WireError> {
    if buf.last() != Some(&UNIT_SEPARATOR) {
        return Ok(HeaderDecode::Resync);
    }
    let header_bytes = &buf[..buf.len() - 1];
    let proto = HeaderProto::decode(header_bytes).map_err(|e| WireError::Parse(e.to_string()))?;
    if proto.message_length > max_message_size {
        return Err(WireError::SizeExceeded {
            what: "message",
            actual: proto.message_length as usize,
            max: max_message_size as usize,
        });
    }
    Ok(HeaderDecode::Ready(Header::from_proto(proto)?))
}

/// Encode a full record: `RS | header_len | header | US | message`.
pub fn encode_record(message_bytes: &[u8], header: &Header, max_message_size: u32) -> Result<Vec<u8>, WireError> {
    if message_bytes.len() > max_message_size as usize {
        return Err(WireError::SizeExceeded { what: "message", actual: message_bytes.len(), max: max_message_size as usize });
    }
    let header_bytes = header.to_proto().encode_to_vec();
    if header_bytes.len() > MAX_HEADER_SIZE {
        return Err(WireError::SizeExceeded { what: "header", actual: header_bytes.len(), max: MAX_HEADER_SIZE });
    }

    let mut out = Vec::with_capacity(3 + header_bytes.len() + message_bytes.len());
    out.push(RECORD_SEPARATOR);
    out.push(header_bytes.len() as u8);
    out.extend_from_slice(&header_bytes);
    out.push(UNIT_SEPARATOR);
    out.extend_from_slice(message_bytes);
    Ok(out)
}

/// Encode a [`MessageProto`] as a full framed record, optionally signing
/// it with `signer`.
#[cfg(feature = "hmac-signing")]
pub fn encode_message_record(
    message: &MessageProto,
    signer: Option<&super::hmac_sign::Signer>,
    max_message_size: u32,
) -> Result<Vec<u8>, WireError> {
    let message_bytes = message.encode_to_vec();
    let mut header = Header { message_length: message_bytes.len() as u32, ..Header::default() };
    if let Some(signer) = signer {
        header.hmac_hash_function = Some(signer.hash_function());
        header.hmac_signer = signer.name().to_string();
        header.hmac_key_version = signer.key_version();
        header.hmac = signer.sign(&message_bytes);
    }
    encode_record(&message_bytes, &header, max_message_size)
}

/// Encode a [`MessageProto`] as a full framed record, unsigned.
#[cfg(not(feature = "hmac-signing"))]
pub fn encode_message_record(message: &MessageProto, max_message_size: u32) -> Result<Vec<u8>, WireError> {
    let message_bytes = message.encode_to_vec();
    let header = Header { message_length: message_bytes.len() as u32, ..Header::default() };
    encode_record(&message_bytes, &header, max_message_size)
}

/// Incremental record reader: buffers bytes fed via [`RecordReader::feed`]
/// and yields framed records via [`RecordReader::next_record`], resyncing
/// past malformed framing by scanning forward to the next
/// [`RECORD_SEPARATOR`] (§4.2, §7's `ParseError` resynchronization rule).
#[derive(Debug, Default)]
pub struct RecordReader {
    buf: Vec<u8>,
    /// Bytes dropped while resynchronizing, for diagnostics/metrics.
    pub garbage_bytes: u64,
}

/// One fully-framed record, header plus raw message bytes (not yet
/// protobuf-decoded into a [`MessageProto`] — `RecordReader` only handles
/// framing; callers decode/convert the message bytes themselves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    pub message_bytes: Vec<u8>,
}

impl RecordReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pull the next complete record out of the buffered bytes, if one is
    /// available. Returns `Ok(None)` when more bytes are needed; malformed
    /// framing is skipped internally (counted in `garbage_bytes`) rather
    /// than surfaced, except for header `SizeExceeded`/`ParseError`, which
    /// are reported once per occurrence before the reader resyncs.
    pub fn next_record(&mut self, max_message_size: u32) -> Result<Option<Record>, WireError> {
        loop {
            let Some(rs_pos) = self.buf.iter().position(|&b| b == RECORD_SEPARATOR) else {
                // No separator at all: everything buffered is garbage.
                self.garbage_bytes += self.buf.len() as u64;
                self.buf.clear();
                return Ok(None);
            };
            if rs_pos > 0 {
                self.garbage_bytes += rs_pos as u64;
                self.buf.drain(..rs_pos);
            }

            if self.buf.len() < 2 {
                return Ok(None); // need the header-length byte
            }
            let header_len = self.buf[1] as usize;
            let header_end = 2 + header_len + 1; // + UNIT_SEPARATOR
            if self.buf.len() < header_end {
                return Ok(None);
            }

            match decode_header(&self.buf[2..header_end], max_message_size) {
                Ok(HeaderDecode::Resync) => {
                    // Drop just the RS byte and look for the next one.
                    self.garbage_bytes += 1;
                    self.buf.drain(..1);
                    continue;
                }
                Err(err) => {
                    // ParseError/SizeExceeded: drop this record's framing
                    // prefix and resynchronize on the next attempt.
                    self.garbage_bytes += header_end as u64;
                    self.buf.drain(..header_end);
                    return Err(err);
                }
                Ok(HeaderDecode::Ready(header)) => {
                    let total = header_end + header.message_length as usize;
                    if self.buf.len() < total {
                        return Ok(None);
                    }
                    let message_bytes = self.buf[header_end..total].to_vec();
                    self.buf.drain(..total);
                    return Ok(Some(Record { header, message_bytes }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e3_truncated_unit_separator_resyncs_without_error() {
        let header = HeaderProto { message_length: 5, ..Default::default() };
        let header_bytes = header.encode_to_vec();
        let mut buf = header_bytes.clone();
        // No trailing UNIT_SEPARATOR appended: simulate truncation.
        let result = decode_header(&buf, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert_eq!(result, HeaderDecode::Resync);

        buf.push(UNIT_SEPARATOR);
        let result = decode_header(&buf, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert!(matches!(result, HeaderDecode::Ready(h) if h.message_length == 5));
    }

    #[test]
    fn header_exceeding_max_message_size_is_rejected() {
        let header = HeaderProto { message_length: 100, ..Default::default() };
        let mut buf = header.encode_to_vec();
        buf.push(UNIT_SEPARATOR);
        let err = decode_header(&buf, 10).unwrap_err();
        assert!(matches!(err, WireError::SizeExceeded { .. }));
    }

    #[test]
    fn round_trips_a_full_record() {
        let message_bytes = b"hello world".to_vec();
        let header = Header { message_length: message_bytes.len() as u32, ..Header::default() };
        let encoded = encode_record(&message_bytes, &header, DEFAULT_MAX_MESSAGE_SIZE).unwrap();

        let mut reader = RecordReader::new();
        reader.feed(&encoded);
        let record = reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap().unwrap();
        assert_eq!(record.header.message_length, message_bytes.len() as u32);
        assert_eq!(record.message_bytes, message_bytes);
    }

    #[test]
    fn reader_resyncs_past_garbage_prefix() {
        let message_bytes = b"hi".to_vec();
        let header = Header { message_length: message_bytes.len() as u32, ..Header::default() };
        let encoded = encode_record(&message_bytes, &header, DEFAULT_MAX_MESSAGE_SIZE).unwrap();

        let mut reader = RecordReader::new();
        reader.feed(b"\x00\x01garbage-not-a-record");
        reader.feed(&encoded);
        let record = reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap().unwrap();
        assert_eq!(record.message_bytes, message_bytes);
        assert!(reader.garbage_bytes > 0);
    }

    #[test]
    fn reader_waits_for_more_bytes_on_partial_record() {
        let message_bytes = b"partial".to_vec();
        let header = Header { message_length: message_bytes.len() as u32, ..Header::default() };
        let encoded = encode_record(&message_bytes, &header, DEFAULT_MAX_MESSAGE_SIZE).unwrap();

        let mut reader = RecordReader::new();
        reader.feed(&encoded[..encoded.len() - 3]);
        assert!(reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap().is_none());
        reader.feed(&encoded[encoded.len() - 3..]);
        assert!(reader.next_record(DEFAULT_MAX_MESSAGE_SIZE).unwrap().is_some());
    }
}
