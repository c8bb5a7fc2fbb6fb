// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive-descent parser for the matcher DSL (§4.3).
//!
//! The spec describes compilation as "emit a flat list of statement nodes,
//! then fold it into a tree via a shunting-yard-style stack" — an artifact
//! of the original generator's two-pass design. A recursive-descent parser
//! that respects the same `&&`-binds-tighter-than-`||`, left-associative
//! precedence produces an identical tree shape in one pass, so that's what
//! this builds (see DESIGN.md).

use super::ast::{FieldSelector, Leaf, Matcher, Node, Op, Rhs};
use super::error::SyntaxError;
use super::lexer::{Lexer, ReOp, RelOp, Token};
use super::optimize::optimize;
use regex::Regex;
use std::sync::Arc;

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    pos: usize,
}

/// Compile a matcher specification string into an immutable, concurrently
/// evaluable [`Matcher`].
pub fn compile(spec: &str) -> Result<Matcher, SyntaxError> {
    if spec.trim().is_empty() {
        return Err(SyntaxError::new(0, "", "empty matcher specification"));
    }
    let mut parser = Parser::new(spec)?;
    let root = parser.parse_or()?;
    if parser.current != Token::Eof {
        return Err(SyntaxError::new(parser.pos, format!("{:?}", parser.current), "trailing input after expression"));
    }
    let root = optimize(root);
    Ok(Matcher {
        root: Arc::new(root),
        source: Arc::from(spec),
    })
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(input);
        let (current, pos) = lexer.next_token()?;
        Ok(Self { lexer, current, pos })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        let (tok, pos) = self.lexer.next_token()?;
        self.current = tok;
        self.pos = pos;
        Ok(())
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.pos, format!("{:?}", self.current), message)
    }

    /// `expr := expr '||' expr | ...` (left-associative, lowest precedence).
    fn parse_or(&mut self) -> Result<Node, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.current == Token::Or {
            self.advance()?;
            let right = self.parse_and()?;
            left = Node::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `&&` binds tighter than `||`.
    fn parse_and(&mut self) -> Result<Node, SyntaxError> {
        let mut left = self.parse_unary()?;
        while self.current == Token::And {
            self.advance()?;
            let right = self.parse_unary()?;
            left = Node::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, SyntaxError> {
        if self.current == Token::LParen {
            self.advance()?;
            let inner = self.parse_or()?;
            if self.current != Token::RParen {
                return Err(self.err("expected ')'"));
            }
            self.advance()?;
            return Ok(inner);
        }
        self.parse_test()
    }

    fn parse_test(&mut self) -> Result<Node, SyntaxError> {
        let Token::Ident(name) = &self.current else {
            return Err(self.err("expected a boolean literal, variable, or field test"));
        };
        let name = name.clone();

        match name.as_str() {
            "TRUE" => {
                self.advance()?;
                return Ok(Node::Bool(true));
            }
            "FALSE" => {
                self.advance()?;
                return Ok(Node::Bool(false));
            }
            "Fields" => return self.parse_field_test(),
            _ => {}
        }

        let selector = base_selector(&name).ok_or_else(|| self.err(format!("unknown identifier '{name}'")))?;
        self.advance()?;
        self.parse_base_test(selector)
    }

    fn parse_base_test(&mut self, selector: FieldSelector) -> Result<Node, SyntaxError> {
        let numeric = selector.is_numeric_var();
        match self.current.clone() {
            Token::RelOp(rel) => {
                self.advance()?;
                let op = rel_to_op(rel);
                let rhs = self.parse_rhs(numeric)?;
                if matches!(rhs, Rhs::Nil) {
                    return Err(self.err("NIL is only valid in an equality test against a Fields[...] selector"));
                }
                if matches!(rhs, Rhs::Regex(..)) {
                    return Err(self.err("a regex literal cannot appear on the right of a relational operator"));
                }
                Ok(Node::Leaf(Leaf { selector, op, rhs }))
            }
            Token::ReOp(re) => {
                if numeric {
                    return Err(self.err("regex operator cannot be used against a numeric variable"));
                }
                self.advance()?;
                let op = if re == ReOp::Match { Op::Match } else { Op::NotMatch };
                let rhs = self.parse_regex_rhs()?;
                Ok(Node::Leaf(Leaf { selector, op, rhs }))
            }
            _ => Err(self.err("expected a relational or regex operator")),
        }
    }

    fn parse_field_test(&mut self) -> Result<Node, SyntaxError> {
        self.advance()?; // consume "Fields"
        if self.current != Token::LBracket {
            return Err(self.err("expected '[' after Fields"));
        }
        self.advance()?;
        let Token::Ident(field_name) = self.current.clone() else {
            return Err(self.err("expected a field name inside Fields[...]"));
        };
        self.advance()?;
        if self.current != Token::RBracket {
            return Err(self.err("expected ']'"));
        }
        self.advance()?;

        let field_index = self.parse_optional_index()?.unwrap_or(0);
        let array_index = self.parse_optional_index()?.unwrap_or(0);
        // A fourth bracket pair would make this more than three total
        // (name + field-index + array-index) — reject it.
        if self.current == Token::LBracket {
            return Err(self.err("field subscript has more than three bracket pairs"));
        }

        let selector = FieldSelector::Fields { name: field_name.clone(), field_index, array_index };

        match self.current.clone() {
            Token::RelOp(rel) => {
                self.advance()?;
                let op = rel_to_op(rel);
                let rhs = self.parse_rhs(false)?;
                if matches!(rhs, Rhs::Nil) && !matches!(op, Op::Eq | Op::Ne) {
                    return Err(self.err("NIL is only valid with == or !="));
                }
                if matches!(rhs, Rhs::Regex(..)) {
                    return Err(self.err("a regex literal cannot appear on the right of a relational operator"));
                }
                Ok(Node::Leaf(Leaf { selector, op, rhs }))
            }
            Token::ReOp(re) => {
                self.advance()?;
                let op = if re == ReOp::Match { Op::Match } else { Op::NotMatch };
                let rhs = self.parse_regex_rhs()?;
                Ok(Node::Leaf(Leaf { selector, op, rhs }))
            }
            _ => Err(self.err("expected a relational or regex operator")),
        }
    }

    fn parse_optional_index(&mut self) -> Result<Option<usize>, SyntaxError> {
        if self.current != Token::LBracket {
            return Ok(None);
        }
        self.advance()?;
        let Token::Number(n) = self.current else {
            return Err(self.err("field subscript index must be numeric"));
        };
        if n.fract() != 0.0 || n < 0.0 {
            return Err(self.err("field subscript index must be a non-negative integer"));
        }
        self.advance()?;
        if self.current != Token::RBracket {
            return Err(self.err("expected ']'"));
        }
        self.advance()?;
        Ok(Some(n as usize))
    }

    fn parse_rhs(&mut self, numeric: bool) -> Result<Rhs, SyntaxError> {
        match self.current.clone() {
            Token::String(s) if !numeric => {
                self.advance()?;
                Ok(Rhs::Str(s))
            }
            Token::Number(n) => {
                self.advance()?;
                Ok(Rhs::Num(n))
            }
            Token::Ident(name) if name == "TRUE" && !numeric => {
                self.advance()?;
                Ok(Rhs::Bool(true))
            }
            Token::Ident(name) if name == "FALSE" && !numeric => {
                self.advance()?;
                Ok(Rhs::Bool(false))
            }
            Token::Ident(name) if name == "NIL" => {
                self.advance()?;
                Ok(Rhs::Nil)
            }
            Token::Regex(_) if !numeric => {
                // Caught by the caller so it can attach the more specific
                // "regex on the right of a relational operator" message.
                let Token::Regex(pattern) = self.current.clone() else { unreachable!() };
                self.advance()?;
                compile_regex_rhs(&pattern, self.pos)
            }
            _ => Err(self.err("expected a value")),
        }
    }

    fn parse_regex_rhs(&mut self) -> Result<Rhs, SyntaxError> {
        let Token::Regex(pattern) = self.current.clone() else {
            return Err(self.err("expected a regex literal"));
        };
        self.advance()?;
        compile_regex_rhs(&pattern, self.pos)
    }
}

fn compile_regex_rhs(pattern: &str, pos: usize) -> Result<Rhs, SyntaxError> {
    let re = Regex::new(pattern).map_err(|e| SyntaxError::new(pos, pattern, format!("malformed regex: {e}")))?;
    Ok(Rhs::Regex(Arc::new(re), Arc::from(pattern)))
}

fn rel_to_op(rel: RelOp) -> Op {
    match rel {
        RelOp::Eq => Op::Eq,
        RelOp::Ne => Op::Ne,
        RelOp::Lt => Op::Lt,
        RelOp::Le => Op::Le,
        RelOp::Gt => Op::Gt,
        RelOp::Ge => Op::Ge,
    }
}

fn base_selector(name: &str) -> Option<FieldSelector> {
    Some(match name {
        "Uuid" => FieldSelector::Uuid,
        "Type" => FieldSelector::Type,
        "Logger" => FieldSelector::Logger,
        "Payload" => FieldSelector::Payload,
        "EnvVersion" => FieldSelector::EnvVersion,
        "Hostname" => FieldSelector::Hostname,
        "Timestamp" => FieldSelector::Timestamp,
        "Severity" => FieldSelector::Severity,
        "Pid" => FieldSelector::Pid,
        _ => return None,
    })
}
