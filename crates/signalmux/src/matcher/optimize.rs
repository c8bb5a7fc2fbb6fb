// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regex literal-prefix optimization (§4.3, §9.5).
//!
//! A pure tree-to-tree rewrite: when a regex is a pure anchored literal
//! (`^literal` or `literal$`, with no other metacharacters), substitute a
//! `StartsWith`/`EndsWith` string test. This is correctness-preserving only
//! for anchored literals — anything containing other regex metacharacters
//! is left as a regex test.

use super::ast::{Leaf, Node, Rhs};

/// Rewrite every leaf in `node` that carries an anchored-literal regex into
/// an equivalent `StartsWith`/`EndsWith` test.
pub(super) fn optimize(node: Node) -> Node {
    match node {
        Node::And(l, r) => Node::And(Box::new(optimize(*l)), Box::new(optimize(*r))),
        Node::Or(l, r) => Node::Or(Box::new(optimize(*l)), Box::new(optimize(*r))),
        Node::Bool(b) => Node::Bool(b),
        Node::Leaf(leaf) => Node::Leaf(optimize_leaf(leaf)),
    }
}

fn optimize_leaf(leaf: Leaf) -> Leaf {
    let Leaf { selector, op, rhs } = leaf;
    let Rhs::Regex(_, pattern) = &rhs else {
        return Leaf { selector, op, rhs };
    };
    let Some(new_rhs) = anchored_literal_rewrite(pattern) else {
        return Leaf { selector, op, rhs };
    };
    // `=~`/`!~` keep their polarity under the rewrite — StartsWith/EndsWith
    // is tested the same "does it hold" sense the regex op already carries.
    Leaf { selector, op, rhs: new_rhs }
}

/// A regex is a "pure anchored literal" when, after stripping a single
/// leading `^` or trailing `$`, every remaining character is a literal (no
/// `.`, `*`, `+`, `?`, `[`, `]`, `(`, `)`, `{`, `}`, `|`, `\`) — i.e. the
/// literal prefix the `regex` crate can report for it spans the whole
/// (stripped) pattern.
fn anchored_literal_rewrite(pattern: &str) -> Option<Rhs> {
    const METACHARS: &[char] = &['.', '*', '+', '?', '[', ']', '(', ')', '{', '}', '|', '\\', '^', '$'];

    if let Some(rest) = pattern.strip_prefix('^') {
        if !rest.is_empty() && !rest.ends_with('$') && !rest.contains(METACHARS) {
            return Some(Rhs::StartsWith(rest.to_string()));
        }
    }
    if let Some(rest) = pattern.strip_suffix('$') {
        if !rest.is_empty() && !rest.starts_with('^') && !rest.contains(METACHARS) {
            return Some(Rhs::EndsWith(rest.to_string()));
        }
    }
    None
}
