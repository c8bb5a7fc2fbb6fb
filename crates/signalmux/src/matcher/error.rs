// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while compiling or evaluating a matcher expression.

use thiserror::Error;

/// Failure compiling a matcher specification string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at position {position}: {message} (token: {token:?})")]
pub struct SyntaxError {
    /// Byte offset into the source spec where the offending token starts.
    pub position: usize,
    /// The offending token's textual form, if one could be identified.
    pub token: String,
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl SyntaxError {
    pub(super) fn new(position: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            position,
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while evaluating a compiled matcher against a message.
///
/// Parsing rejects every statically-detectable type error (e.g. a regex
/// operator against a numeric base variable); this only covers the one
/// case that cannot be known until a concrete message is evaluated: a
/// regex operator against a dynamic `Fields[...]` selector that turns out
/// to hold an `INTEGER` or `DOUBLE` value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("regex operator applied to numeric field '{field}'")]
    RegexOnNumericField { field: String },
}
