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

//! The lexing logic for operator expressions, responsible for turning the expression string into
//! a [TokenStream] for consumption by the parsing machinery.  The strategy is simple single-byte
//! lookahead: every symbol token is one byte long, and the multi-byte tokens (identifiers and
//! numeric literals) are each read to completion before the token is emitted.  The two keyword
//! symbols of the arithmetic sub-language (`pi` and `sqrt`) are recognized after an identifier has
//! been read in full, so `pib` lexes as a single ordinary identifier rather than a keyword
//! followed by junk.

use crate::error::GrammarError;

/// An enumeration of the different types of [Token] that can be created during lexing.  This is
/// deliberately not a data enum; tokens carry only their span, and the text is re-borrowed from
/// the source when a consumer actually needs it.  This keeps [Token] `Copy`, which the parser
/// leans on when peeking.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TokenType {
    // Keywords of the arithmetic sub-language.
    Pi,
    Sqrt,
    // Symbols.
    Plus,
    Minus,
    Asterisk,
    Slash,
    Comma,
    Colon,
    LParen,
    RParen,
    // Content.
    Id,
    Integer,
    Real,
}

impl TokenType {
    /// A human-readable description of the token type, used to build error messages of the
    /// "needed X, but saw Y" form.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Pi => "'pi'",
            TokenType::Sqrt => "'sqrt'",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Asterisk => "'*'",
            TokenType::Slash => "'/'",
            TokenType::Comma => "','",
            TokenType::Colon => "':'",
            TokenType::LParen => "'('",
            TokenType::RParen => "')'",
            TokenType::Id => "an identifier",
            TokenType::Integer => "an integer",
            TokenType::Real => "a real number",
        }
    }
}

/// A single token from the expression.  Only the span is stored; use [TokenStream::text] to
/// recover the characters.
#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub ttype: TokenType,
    pub start: usize,
    pub end: usize,
}

/// A lexer over an expression string, with single-token lookahead.  The full expression is always
/// in memory (expressions are short), so the lexer borrows rather than buffering.
pub struct TokenStream<'a> {
    source: &'a str,
    offset: usize,
    peeked: Option<Option<Token>>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            peeked: None,
        }
    }

    /// The characters of a previously lexed token.
    pub fn text(&self, token: &Token) -> &'a str {
        &self.source[token.start..token.end]
    }

    /// The next token, or `None` at the end of the expression.
    pub fn next(&mut self) -> Result<Option<Token>, GrammarError> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(peeked);
        }
        self.lex_one()
    }

    /// Peek the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<Token>, GrammarError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lex_one()?);
        }
        Ok(self.peeked.unwrap())
    }

    fn lex_one(&mut self) -> Result<Option<Token>, GrammarError> {
        let bytes = self.source.as_bytes();
        while self.offset < bytes.len() && bytes[self.offset].is_ascii_whitespace() {
            self.offset += 1;
        }
        if self.offset >= bytes.len() {
            return Ok(None);
        }
        let start = self.offset;
        let single = |ttype| {
            Some(Token {
                ttype,
                start,
                end: start + 1,
            })
        };
        match bytes[start] {
            b'+' => {
                self.offset += 1;
                Ok(single(TokenType::Plus))
            }
            b'-' => {
                self.offset += 1;
                Ok(single(TokenType::Minus))
            }
            b'*' => {
                self.offset += 1;
                Ok(single(TokenType::Asterisk))
            }
            b'/' => {
                self.offset += 1;
                Ok(single(TokenType::Slash))
            }
            b',' => {
                self.offset += 1;
                Ok(single(TokenType::Comma))
            }
            b':' => {
                self.offset += 1;
                Ok(single(TokenType::Colon))
            }
            b'(' => {
                self.offset += 1;
                Ok(single(TokenType::LParen))
            }
            b')' => {
                self.offset += 1;
                Ok(single(TokenType::RParen))
            }
            b'0'..=b'9' | b'.' => self.lex_number(start),
            b if b.is_ascii_alphabetic() || b == b'_' => Ok(Some(self.lex_identifier(start))),
            b => Err(GrammarError::UnexpectedCharacter {
                found: b as char,
                offset: start,
            }),
        }
    }

    /// Lex a numeric literal.  Accepts plain integers, decimal reals with the point in any
    /// position (including a leading or trailing point) and an optional signed exponent.  The
    /// token is classified [TokenType::Integer] only when it consists purely of digits.
    fn lex_number(&mut self, start: usize) -> Result<Option<Token>, GrammarError> {
        let bytes = self.source.as_bytes();
        let mut seen_point = false;
        let mut seen_digit = false;
        while self.offset < bytes.len() {
            match bytes[self.offset] {
                b'0'..=b'9' => {
                    seen_digit = true;
                    self.offset += 1;
                }
                b'.' if !seen_point => {
                    seen_point = true;
                    self.offset += 1;
                }
                _ => break,
            }
        }
        if !seen_digit {
            return Err(GrammarError::UnexpectedCharacter {
                found: '.',
                offset: start,
            });
        }
        let mut is_real = seen_point;
        if self.offset < bytes.len() && (bytes[self.offset] | 0x20) == b'e' {
            let mut lookahead = self.offset + 1;
            if lookahead < bytes.len() && (bytes[lookahead] == b'+' || bytes[lookahead] == b'-') {
                lookahead += 1;
            }
            if lookahead < bytes.len() && bytes[lookahead].is_ascii_digit() {
                self.offset = lookahead;
                while self.offset < bytes.len() && bytes[self.offset].is_ascii_digit() {
                    self.offset += 1;
                }
                is_real = true;
            }
        }
        Ok(Some(Token {
            ttype: if is_real {
                TokenType::Real
            } else {
                TokenType::Integer
            },
            start,
            end: self.offset,
        }))
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        let bytes = self.source.as_bytes();
        while self.offset < bytes.len()
            && (bytes[self.offset].is_ascii_alphanumeric() || bytes[self.offset] == b'_')
        {
            self.offset += 1;
        }
        let ttype = match &self.source[start..self.offset] {
            "pi" => TokenType::Pi,
            "sqrt" => TokenType::Sqrt,
            _ => TokenType::Id,
        };
        Token {
            ttype,
            start,
            end: self.offset,
        }
    }
}
