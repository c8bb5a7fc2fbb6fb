// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the record framing and protobuf conversion layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("protobuf parse error: {0}")]
    Parse(String),

    #[error("{what} size {actual} exceeds configured maximum {max}")]
    SizeExceeded { what: &'static str, actual: usize, max: usize },

    #[error("HMAC signature verification failed")]
    SignatureInvalid,

    #[error("message uuid must be empty or exactly 16 bytes, got {0}")]
    InvalidUuid(usize),

    #[error("unknown valueType enum discriminant {0}")]
    UnknownValueType(i32),

    #[error("unknown hmacHashFunction enum discriminant {0}")]
    UnknownHmacHashFunction(i32),

    #[error("field '{0}' has no values in any of its value arrays")]
    EmptyFieldValues(String),
}
