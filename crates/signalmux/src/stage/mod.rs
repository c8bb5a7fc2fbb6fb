// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stage runner (§4.7): generic drivers for the five plugin kinds
//! (input, decoder, filter, encoder, output), plus supervised restart
//! with exponential backoff (§5).

mod error;
mod input;
mod runner;
mod supervisor;
mod traits;

pub use error::StageError;
pub use input::{run_input, Source};
pub use runner::{run_filter, run_output, CursorSink, RunnerStats};
pub use supervisor::{supervise, BackoffPolicy, StopSignal};
pub use traits::{Decoder, Encoder, Filter, Outcome, Sink};
