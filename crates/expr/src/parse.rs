// This code is part of Qiskit.
//
// (C) Copyright IBM 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! The parser for operator expressions of the form `NAME(arg, ...):NAME(arg, ...):...`, plus an
//! operator-precedence subparser for the arithmetic arguments.  The arithmetic sub-language is
//! deliberately tiny: numeric literals, `pi`, `sqrt(...)`, the four binary operators, unary sign
//! and parentheses.  Nothing else ever resolves; there is no environment to look names up in, so
//! evaluating an argument can never run anything.
//!
//! Whether an argument is a subsystem label or a number depends on which primitive consumes it
//! (the same position is an angle for one gate and a label for another), so the parser does not
//! decide: a bare identifier becomes [Argument::Label] and everything else becomes an arithmetic
//! [Expr], and the consumer asks for the form it needs.

use crate::error::GrammarError;
use crate::lex::{Token, TokenStream, TokenType};

/// A parsed operator expression: one or more colon-separated terms, composed by the consumer.
#[derive(Clone, Debug, PartialEq)]
pub struct OpExpression {
    pub terms: Vec<OpTerm>,
}

/// A single `NAME(arg, ...)` term.
#[derive(Clone, Debug, PartialEq)]
pub struct OpTerm {
    pub name: String,
    pub args: Vec<Argument>,
}

/// One argument of a term.  A bare identifier is a subsystem label; anything arithmetic is an
/// expression tree, evaluated on demand.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Label(String),
    Expr(Expr),
}

impl Argument {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Argument::Label(label) => Some(label),
            Argument::Expr(_) => None,
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Argument::Label(_) => None,
            Argument::Expr(expr) => Some(expr),
        }
    }
}

/// The arithmetic expression tree for numeric arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    Pi,
    Sqrt(Box<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    /// Evaluate the expression.  `allow_sqrt` gates the one function of the sub-language; some
    /// primitives accept only `pi`-arithmetic in their angle arguments.
    pub fn evaluate(&self, allow_sqrt: bool) -> Result<f64, GrammarError> {
        match self {
            Expr::Const(value) => Ok(*value),
            Expr::Pi => Ok(std::f64::consts::PI),
            Expr::Sqrt(inner) => {
                if !allow_sqrt {
                    return Err(GrammarError::SqrtForbidden);
                }
                Ok(inner.evaluate(allow_sqrt)?.sqrt())
            }
            Expr::Neg(inner) => Ok(-inner.evaluate(allow_sqrt)?),
            Expr::Binary { op, left, right } => {
                let left = left.evaluate(allow_sqrt)?;
                let right = right.evaluate(allow_sqrt)?;
                match op {
                    BinaryOp::Add => Ok(left + right),
                    BinaryOp::Sub => Ok(left - right),
                    BinaryOp::Mul => Ok(left * right),
                    BinaryOp::Div => {
                        if right == 0.0 {
                            Err(GrammarError::DivisionByZero)
                        } else {
                            Ok(left / right)
                        }
                    }
                }
            }
        }
    }
}

/// Parse a complete operator expression.
pub fn parse(source: &str) -> Result<OpExpression, GrammarError> {
    let mut stream = TokenStream::new(source);
    let mut terms = vec![parse_term(&mut stream)?];
    loop {
        match stream.next()? {
            None => break,
            Some(token) if token.ttype == TokenType::Colon => terms.push(parse_term(&mut stream)?),
            Some(token) => {
                return Err(incorrect(&stream, "':' or the end of the expression", &token))
            }
        }
    }
    Ok(OpExpression { terms })
}

fn incorrect(stream: &TokenStream, required: &'static str, token: &Token) -> GrammarError {
    GrammarError::IncorrectToken {
        required,
        found: format!("'{}'", stream.text(token)),
        offset: token.start,
    }
}

fn expect(
    stream: &mut TokenStream,
    expected: TokenType,
    required: &'static str,
) -> Result<Token, GrammarError> {
    match stream.next()? {
        None => Err(GrammarError::UnexpectedEof { required }),
        Some(token) if token.ttype == expected => Ok(token),
        Some(token) => Err(incorrect(stream, required, &token)),
    }
}

fn parse_term(stream: &mut TokenStream) -> Result<OpTerm, GrammarError> {
    let name = expect(stream, TokenType::Id, "a gate name")?;
    let name = stream.text(&name).to_owned();
    expect(stream, TokenType::LParen, "'('")?;
    let mut args = Vec::new();
    loop {
        args.push(parse_argument(stream)?);
        match stream.next()? {
            None => return Err(GrammarError::UnexpectedEof { required: "')'" }),
            Some(token) if token.ttype == TokenType::Comma => continue,
            Some(token) if token.ttype == TokenType::RParen => break,
            Some(token) => return Err(incorrect(stream, "',' or ')'", &token)),
        }
    }
    Ok(OpTerm { name, args })
}

fn parse_argument(stream: &mut TokenStream) -> Result<Argument, GrammarError> {
    // A bare identifier can only be a subsystem label; `pi` and `sqrt` lex as their own token
    // types, so they never collide with this arm.
    if let Some(token) = stream.peek()? {
        if token.ttype == TokenType::Id {
            stream.next()?;
            return Ok(Argument::Label(stream.text(&token).to_owned()));
        }
    }
    Ok(Argument::Expr(parse_expr(stream, 0)?))
}

/// The binding powers of the binary operators, in the standard Pratt formulation: a
/// left-associative operator binds its right side slightly tighter than its left.
fn binary_power(ttype: TokenType) -> Option<(u8, u8)> {
    match ttype {
        TokenType::Plus | TokenType::Minus => Some((1, 2)),
        TokenType::Asterisk | TokenType::Slash => Some((3, 4)),
        _ => None,
    }
}

/// The power that unary sign binds its operand with; tighter than any binary operator, so
/// `-pi/2` is `(-pi)/2` and, equivalently, `-(pi/2)`.
const PREFIX_POWER: u8 = 5;

fn parse_expr(stream: &mut TokenStream, min_power: u8) -> Result<Expr, GrammarError> {
    let token = stream
        .next()?
        .ok_or(GrammarError::UnexpectedEof {
            required: "an arithmetic expression",
        })?;
    let mut lhs = match token.ttype {
        TokenType::Integer | TokenType::Real => {
            // The lexer guarantees the span is a valid float literal.
            Expr::Const(stream.text(&token).parse().unwrap())
        }
        TokenType::Pi => Expr::Pi,
        TokenType::Sqrt => {
            expect(stream, TokenType::LParen, "'(' after 'sqrt'")?;
            let inner = parse_expr(stream, 0)?;
            expect(stream, TokenType::RParen, "')'")?;
            Expr::Sqrt(Box::new(inner))
        }
        TokenType::Minus => Expr::Neg(Box::new(parse_expr(stream, PREFIX_POWER)?)),
        TokenType::Plus => parse_expr(stream, PREFIX_POWER)?,
        TokenType::LParen => {
            let inner = parse_expr(stream, 0)?;
            expect(stream, TokenType::RParen, "')'")?;
            inner
        }
        _ => return Err(incorrect(stream, "an arithmetic expression", &token)),
    };
    while let Some(op_token) = stream.peek()? {
        let Some((left_power, right_power)) = binary_power(op_token.ttype) else {
            break;
        };
        if left_power < min_power {
            break;
        }
        stream.next()?;
        let rhs = parse_expr(stream, right_power)?;
        lhs = Expr::Binary {
            op: match op_token.ttype {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Sub,
                TokenType::Asterisk => BinaryOp::Mul,
                TokenType::Slash => BinaryOp::Div,
                _ => unreachable!("binary_power admits only the four binary operators"),
            },
            left: Box::new(lhs),
            right: Box::new(rhs),
        };
    }
    Ok(lhs)
}
