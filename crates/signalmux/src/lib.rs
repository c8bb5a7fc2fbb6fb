// SPDX-License-Identifier: Apache-2.0 OR MIT

//! signalmux: a structured-log/event processing daemon core.
//!
//! A canonical [`message`] model with a binary [`wire`] format, a
//! [`matcher`] DSL compiled to an expression tree, a recyclable [`pool`]
//! of carriers, a fan-out [`router`], and a [`stage`] runner that drives
//! input/decoder/filter/encoder/output plugins over it.
//!
//! Grounded throughout on the `hdds` DDS middleware's module shape: a
//! plain-`log` core library with `thiserror`-derived per-subsystem error
//! enums, copy-on-write shared registries, and lock-free pooling — see
//! `DESIGN.md` for the full grounding ledger.

pub mod config;
pub mod matcher;
pub mod message;
pub mod pool;
pub mod router;
pub mod stage;
pub mod wire;

pub use config::{ConfigError, PipelineConfig};
pub use matcher::{compile, EvalError, Matcher, SyntaxError};
pub use message::{Field, FieldError, FieldValue, Message, MessageUuid, ValueType};
pub use pool::{Carrier, PacketPool, QueueCursor};
pub use router::{OverflowPolicy, Router, Subscriber, SubscriberHandle, SubscriberStats, SubscriberStatsSnapshot};
pub use stage::{BackoffPolicy, Decoder, Encoder, Filter, Outcome, Sink, StageError, StopSignal};
pub use wire::WireError;
