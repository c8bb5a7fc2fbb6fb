// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matcher evaluation (§4.4): a pure function of `(tree, message)`, no
//! internal state mutated, short-circuiting on `&&`/`||`.

use super::ast::{FieldSelector, Leaf, Matcher, Node, Op, Rhs};
use super::error::EvalError;
use crate::message::{Field, FieldValue, Message, ValueType};

impl Matcher {
    /// Evaluate this matcher against `message`.
    ///
    /// Returns `Err` only for the one case that cannot be rejected at parse
    /// time: a regex operator applied to a dynamic field that turns out, at
    /// evaluation time, to hold an `INTEGER` or `DOUBLE` value.
    pub fn evaluate(&self, message: &Message) -> Result<bool, EvalError> {
        evaluate_node(self.root(), message)
    }
}

fn evaluate_node(node: &Node, msg: &Message) -> Result<bool, EvalError> {
    match node {
        Node::Bool(b) => Ok(*b),
        Node::And(l, r) => {
            if !evaluate_node(l, msg)? {
                return Ok(false);
            }
            evaluate_node(r, msg)
        }
        Node::Or(l, r) => {
            if evaluate_node(l, msg)? {
                return Ok(true);
            }
            evaluate_node(r, msg)
        }
        Node::Leaf(leaf) => evaluate_leaf(leaf, msg),
    }
}

fn evaluate_leaf(leaf: &Leaf, msg: &Message) -> Result<bool, EvalError> {
    match &leaf.selector {
        FieldSelector::Fields { name, field_index, array_index } => {
            evaluate_field_leaf(name, *field_index, *array_index, leaf.op, &leaf.rhs, msg)
        }
        sel if sel.is_string_var() => Ok(evaluate_string_var(sel, leaf.op, &leaf.rhs, msg)),
        sel if sel.is_numeric_var() => Ok(evaluate_numeric_var(sel, leaf.op, &leaf.rhs, msg)),
        _ => unreachable!("FieldSelector has no other variants"),
    }
}

fn string_var_value(selector: &FieldSelector, msg: &Message) -> String {
    let opt = match selector {
        FieldSelector::Uuid => return msg.uuid_string(),
        FieldSelector::Type => msg.message_type.as_deref(),
        FieldSelector::Logger => msg.logger.as_deref(),
        FieldSelector::Payload => msg.payload.as_deref(),
        FieldSelector::EnvVersion => msg.env_version.as_deref(),
        FieldSelector::Hostname => msg.hostname.as_deref(),
        _ => unreachable!("only called for string base variables"),
    };
    opt.unwrap_or("").to_string()
}

fn evaluate_string_var(selector: &FieldSelector, op: Op, rhs: &Rhs, msg: &Message) -> bool {
    let value = string_var_value(selector, msg);
    match rhs {
        Rhs::Str(s) => rel_compare_str(op, &value, s),
        Rhs::Regex(re, _) => match op {
            Op::Match => re.is_match(&value),
            Op::NotMatch => !re.is_match(&value),
            _ => false,
        },
        Rhs::StartsWith(prefix) => match op {
            Op::Match => value.starts_with(prefix.as_str()),
            Op::NotMatch => !value.starts_with(prefix.as_str()),
            _ => false,
        },
        Rhs::EndsWith(suffix) => match op {
            Op::Match => value.ends_with(suffix.as_str()),
            Op::NotMatch => !value.ends_with(suffix.as_str()),
            _ => false,
        },
        _ => false,
    }
}

fn numeric_var_value(selector: &FieldSelector, msg: &Message) -> f64 {
    match selector {
        FieldSelector::Timestamp => msg.timestamp as f64,
        FieldSelector::Severity => msg.severity.unwrap_or(0) as f64,
        FieldSelector::Pid => msg.pid.unwrap_or(0) as f64,
        _ => unreachable!("only called for numeric base variables"),
    }
}

fn evaluate_numeric_var(selector: &FieldSelector, op: Op, rhs: &Rhs, msg: &Message) -> bool {
    let value = numeric_var_value(selector, msg);
    match rhs {
        Rhs::Num(n) => rel_compare_f64(op, value, *n),
        _ => false,
    }
}

fn evaluate_field_leaf(
    name: &str,
    field_index: usize,
    array_index: usize,
    op: Op,
    rhs: &Rhs,
    msg: &Message,
) -> Result<bool, EvalError> {
    let count = msg.field_count(name);
    if field_index >= count {
        // Non-existence: only `== NIL` is true; `!= NIL` and everything
        // else is false.
        return Ok(matches!(rhs, Rhs::Nil) && op == Op::Eq);
    }
    if matches!(rhs, Rhs::Nil) {
        // The field exists: `== NIL` is false, `!= NIL` is true.
        return Ok(op == Op::Ne);
    }

    let field = msg.field_at(name, field_index).expect("field_index already bounds-checked");
    let Some(value) = field.value_at(array_index) else {
        return Ok(false);
    };
    evaluate_field_value(name, field, &value, op, rhs)
}

fn evaluate_field_value(name: &str, field: &Field, value: &FieldValue, op: Op, rhs: &Rhs) -> Result<bool, EvalError> {
    match field.value_type() {
        ValueType::String | ValueType::Bytes => {
            let text = match value {
                FieldValue::String(s) => s.clone(),
                FieldValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
                _ => unreachable!("value matches field's declared STRING/BYTES type"),
            };
            Ok(match rhs {
                Rhs::Str(s) => rel_compare_str(op, &text, s),
                Rhs::Regex(re, _) => match op {
                    Op::Match => re.is_match(&text),
                    Op::NotMatch => !re.is_match(&text),
                    _ => false,
                },
                Rhs::StartsWith(p) => match op {
                    Op::Match => text.starts_with(p.as_str()),
                    Op::NotMatch => !text.starts_with(p.as_str()),
                    _ => false,
                },
                Rhs::EndsWith(s) => match op {
                    Op::Match => text.ends_with(s.as_str()),
                    Op::NotMatch => !text.ends_with(s.as_str()),
                    _ => false,
                },
                _ => false,
            })
        }
        ValueType::Integer | ValueType::Double => {
            if matches!(op, Op::Match | Op::NotMatch) {
                return Err(EvalError::RegexOnNumericField { field: name.to_string() });
            }
            let n = match value {
                FieldValue::Integer(i) => *i as f64,
                FieldValue::Double(d) => *d,
                _ => unreachable!("value matches field's declared INTEGER/DOUBLE type"),
            };
            let Rhs::Num(rhs_n) = rhs else { return Ok(false) };
            Ok(rel_compare_f64(op, n, *rhs_n))
        }
        ValueType::Bool => {
            let FieldValue::Bool(b) = value else { unreachable!("value matches field's declared BOOL type") };
            let Rhs::Bool(rhs_b) = rhs else { return Ok(false) };
            Ok(match op {
                Op::Eq => b == rhs_b,
                Op::Ne => b != rhs_b,
                _ => false,
            })
        }
    }
}

fn rel_compare_str(op: Op, lhs: &str, rhs: &str) -> bool {
    match op {
        Op::Eq => lhs == rhs,
        Op::Ne => lhs != rhs,
        Op::Lt => lhs < rhs,
        Op::Le => lhs <= rhs,
        Op::Gt => lhs > rhs,
        Op::Ge => lhs >= rhs,
        Op::Match | Op::NotMatch => false,
    }
}

fn rel_compare_f64(op: Op, lhs: f64, rhs: f64) -> bool {
    match op {
        Op::Eq => lhs == rhs,
        Op::Ne => lhs != rhs,
        Op::Lt => lhs < rhs,
        Op::Le => lhs <= rhs,
        Op::Gt => lhs > rhs,
        Op::Ge => lhs >= rhs,
        Op::Match | Op::NotMatch => false,
    }
}
