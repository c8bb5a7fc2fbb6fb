// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors a plugin stage (input/decoder/filter/encoder/output) may raise
/// (§4.7, §7). Per-message decode/encode/output errors are logged and
/// counted by the runner without aborting the stage; a `run` call itself
/// returning `Err` is what triggers supervisor restart.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("output sink failed: {0}")]
    Output(String),

    #[error("input source failed: {0}")]
    Input(String),
}
