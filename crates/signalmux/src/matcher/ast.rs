// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compiled matcher expression tree (§3.3, §4.3).
//!
//! Mirrors the shape of `hdds`'s `Expression`/`Operator`/`Value` AST
//! (`crates/hdds/src/dds/filter/parser.rs`), generalized from DDS's flat
//! `field op value` comparisons to this grammar's base-field variables,
//! dynamic `Fields[...]` subscripts, and regex tests.

use regex::Regex;
use std::sync::Arc;

/// A compiled matcher: an immutable, `Arc`-shared expression tree. Safe to
/// evaluate concurrently from multiple stages without any lock, per the
/// REDESIGN FLAGS removal of the original process-wide parse-buffer lock.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub(super) root: Arc<Node>,
    pub(super) source: Arc<str>,
}

impl Matcher {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(super) fn root(&self) -> &Node {
        &self.root
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A node in the compiled expression tree: either a logical operator with
/// two children, or a leaf test.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Bool(bool),
    Leaf(Leaf),
}

/// A single test: a field selector, a relational/regex operator, and the
/// right-hand value to compare against.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Leaf {
    pub selector: FieldSelector,
    pub op: Op,
    pub rhs: Rhs,
}

/// Which message field a leaf test reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FieldSelector {
    Uuid,
    Type,
    Logger,
    Payload,
    EnvVersion,
    Hostname,
    Timestamp,
    Severity,
    Pid,
    Fields { name: String, field_index: usize, array_index: usize },
}

impl FieldSelector {
    pub(super) fn is_string_var(&self) -> bool {
        matches!(
            self,
            FieldSelector::Uuid
                | FieldSelector::Type
                | FieldSelector::Logger
                | FieldSelector::Payload
                | FieldSelector::EnvVersion
                | FieldSelector::Hostname
        )
    }

    pub(super) fn is_numeric_var(&self) -> bool {
        matches!(self, FieldSelector::Timestamp | FieldSelector::Severity | FieldSelector::Pid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Match,
    NotMatch,
}

/// The right-hand side of a leaf test.
#[derive(Debug, Clone)]
pub(super) enum Rhs {
    Str(String),
    Num(f64),
    Bool(bool),
    /// A regex right-hand side: the compiled pattern, plus (for the
    /// literal-prefix optimization pass) the original source text.
    Regex(Arc<Regex>, Arc<str>),
    /// The `NIL` existence sentinel.
    Nil,
    /// Compiler-inserted literal prefix/suffix test, substituted for an
    /// anchored-literal regex by the optimization pass (§4.3).
    StartsWith(String),
    EndsWith(String),
}

impl PartialEq for Rhs {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rhs::Str(a), Rhs::Str(b)) => a == b,
            (Rhs::Num(a), Rhs::Num(b)) => a.to_bits() == b.to_bits(),
            (Rhs::Bool(a), Rhs::Bool(b)) => a == b,
            (Rhs::Regex(_, a), Rhs::Regex(_, b)) => a == b,
            (Rhs::Nil, Rhs::Nil) => true,
            (Rhs::StartsWith(a), Rhs::StartsWith(b)) => a == b,
            (Rhs::EndsWith(a), Rhs::EndsWith(b)) => a == b,
            _ => false,
        }
    }
}
