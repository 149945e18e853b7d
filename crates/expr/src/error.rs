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

use thiserror::Error;

/// The grammar-level failure modes of operator expressions.  Everything here is fatal and
/// deterministic; an expression either parses (and its arguments evaluate) or it does not, and the
/// outcome never depends on anything other than the input text.
///
/// The variants that mention a gate name are produced by the consumer of the parsed expression
/// (the primitive registry knows the arities and argument types, the parser does not), but they
/// are grammar errors all the same, so they live in this crate's taxonomy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error("unexpected character '{found}' at byte {offset} of the expression")]
    UnexpectedCharacter { found: char, offset: usize },
    #[error("needed {required}, but instead saw {found} at byte {offset}")]
    IncorrectToken {
        required: &'static str,
        found: String,
        offset: usize,
    },
    #[error("unexpected end of the expression when expecting to see {required}")]
    UnexpectedEof { required: &'static str },
    #[error("'{0}' is not a valid gate name")]
    InvalidGateName(String),
    #[error("'{gate}' expects {expected} arguments, but {found} were given")]
    WrongArgumentCount {
        gate: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of '{gate}' must be a numeric expression")]
    ExpectedNumber { gate: String, position: usize },
    #[error("argument {position} of '{gate}' must be a state-space label")]
    ExpectedLabel { gate: String, position: usize },
    #[error("argument {position} of '{gate}' must be a non-negative integer")]
    ExpectedInteger { gate: String, position: usize },
    #[error("'sqrt' is not allowed in this argument")]
    SqrtForbidden,
    #[error("division by zero while evaluating an argument")]
    DivisionByZero,
}
