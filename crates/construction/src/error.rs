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

//! The error taxonomy of model construction.  Three families matter to callers:
//!
//! * grammar errors (lifted wholesale from the expression crate, plus the unknown-primitive and
//!   arity failures raised when a parsed term is interpreted);
//! * dimension mismatches (state-space labels disagreeing with a basis, gates spanning more than
//!   one tensor-product block, matrices of the wrong size);
//! * unsupported parameterization requests (unitary embedding outside `full`, trace-preserving
//!   operators over a complex basis, `D` outside the linear kinds).
//!
//! Every failure is deterministic in the inputs and raised before the offending matrix work
//! completes; nothing here is retried, and nothing is recoverable in-place.  The one lossy
//! behaviour that is *not* an error — contraction discarding cross-block weight — is reported
//! through `tracing` instead (see [crate::basis::resize_mx]).

use thiserror::Error;

use gateset_expr::GrammarError;

pub type Result<T> = std::result::Result<T, ConstructionError>;

#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("state-space labels imply block dimensions {labels:?}, but the basis has {basis:?}")]
    StateSpaceMismatch {
        labels: Vec<usize>,
        basis: Vec<usize>,
    },
    #[error("labels {labels:?} do not all belong to one tensor-product block")]
    MultiBlockGate { labels: Vec<String> },
    #[error("matrix has dimension {found}, but {expected} is required {context}")]
    MatrixDimension {
        expected: usize,
        found: usize,
        context: &'static str,
    },
    #[error("bases '{from}' and '{to}' have block dimensions {from_dims:?} and {to_dims:?}")]
    IncompatibleBases {
        from: String,
        to: String,
        from_dims: Vec<usize>,
        to_dims: Vec<usize>,
    },

    #[error("unknown state-space label '{0}'")]
    UnknownLabel(String),
    #[error("state-space label '{0}' appears more than once")]
    DuplicateLabel(String),
    #[error("'{gate}' must act on two-level subsystems, but '{label}' has dimension {dim}")]
    NotATwoLevelSystem {
        gate: String,
        label: String,
        dim: usize,
    },

    #[error("unitary embedding only supports the 'full' parameterization, not '{0}'")]
    UnitaryEmbeddingNotFull(String),
    #[error("trace-preserving operators require a real basis, but '{0}' is complex")]
    TpRequiresRealBasis(String),
    #[error("'D' requires direct embedding and a 'linear' or 'linearTP' parameterization")]
    DiagonalGateNotLinear,
    #[error("'{0}' is not a valid parameterization (expected full, TP, static, linear or linearTP)")]
    UnknownParameterization(String),

    #[error("unknown basis '{0}' (expected std, gm, pp or qt)")]
    UnknownBasis(String),
    #[error("invalid basis: {0}")]
    InvalidBasis(String),

    #[error("a state-preparation or effect expression must be the integer index of a state, got '{0}'")]
    BadVectorExpression(String),
    #[error("state index {index} is out of range for a state space of dimension {dim}")]
    StateIndexOutOfRange { index: usize, dim: usize },

    #[error("a matrix cast to real would discard imaginary weight {0:.3e}")]
    ResidualImaginary(f64),
    #[error("trace-preserving operators must have first row [1, 0, ..., 0]")]
    TpFirstRow,
    #[error("parameter vector has length {found}, but this operator has {expected} parameters")]
    ParamCount { expected: usize, found: usize },
    #[error("parameter map coordinate ({row}, {col}) is outside a {dim}x{dim} base matrix")]
    ParamCoordinate { row: usize, col: usize, dim: usize },

    #[error("model has no operation named '{0}'")]
    MissingOperation(String),
}
