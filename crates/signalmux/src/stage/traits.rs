// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The five plugin capability traits (§6.4). The stage runner depends
//! only on these — it never reaches into a plugin's own internals.

use super::error::StageError;
use crate::message::Message;
use crate::pool::Carrier;

/// Synchronous, stateless: given a carrier, produce zero or more output
/// carriers. Most decoders return exactly the carrier they were given
/// after populating its message; a decoder that demultiplexes one input
/// record into several messages returns more than one.
pub trait Decoder: Send {
    fn decode(&self, carrier: Carrier) -> Result<Vec<Carrier>, StageError>;
}

/// Stateless: maps a message to bytes, or `None` to suppress emission
/// entirely (§4.7).
pub trait Encoder: Send {
    fn encode(&self, message: &Message) -> Result<Option<Vec<u8>>, StageError>;
}

/// Consumes carriers delivered to its subscriber inbox, may hold private
/// state (counters, windowed aggregates), and may inject derived carriers
/// back into the router via the `inject` callback passed to `process`.
pub trait Filter: Send {
    fn process(&mut self, carrier: Carrier, inject: &mut dyn FnMut(Carrier)) -> Result<(), StageError>;
}

/// What happened to one delivered carrier at an output (§6.4, §7).
/// `UserAbort` is "do not retry this message" but is still treated as a
/// successful delivery for cursor-advance purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    UserAbort,
}

/// An output's byte sink: a file, a socket, a journal — anything an
/// encoded record can be written to.
pub trait Sink: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<Outcome, StageError>;
}
