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

//! The closed registry of primitive operations an expression term can name, and the synthesis of
//! each one into an embedded, parameterized operator.  Rotation primitives are the exponentials
//! `exp(-i θ G)` with generator `G = Pauli/2` (or the θ-scaled axis combination for `N`), written
//! in closed form.  Controlled primitives act on the target qubit's subspace where the control —
//! always the first label, the most significant tensor factor — is set.  `LX` is the odd one out:
//! it rotates between two basis states of the *whole* state space, across tensor-product blocks
//! if need be, and the cross-block coherences it creates are then discarded by the contraction to
//! the reduced space, which is the decoherence the primitive promises.
//!
//! Adding a primitive means adding a variant here and an arm to [synthesize_term]; an unmatched
//! name is a grammar error, never a fallthrough.

use ndarray::{array, Array2, ArrayView2};
use num_complex::Complex64;
use smallvec::SmallVec;

use gateset_expr::{GrammarError, OpTerm};

use crate::basis::{change_basis, resize_mx, Basis, ResizeMode};
use crate::embed::{embed_process, embed_unitary, EmbedContext, ParamSelection, Parameterization};
use crate::error::{ConstructionError, Result};
use crate::operation::{FullOp, LinearOperator};
use crate::superop::{c64, to_real_checked, unitary_to_process, C_ONE, C_ZERO, IMAG_TOL};

/// The closed set of primitive operation names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// Identity on one or more labelled subsystems.
    I,
    /// Identity whose diagonal entries alone are parameterized (a depolarizing scaffold); only
    /// meaningful with direct embedding and a linear parameterization.
    D,
    /// Single-qubit rotations by an angle about the named axis.
    X,
    Y,
    Z,
    /// General single-qubit rotation with three independent axis coefficients.
    N,
    /// Controlled single-axis rotations.
    Cx,
    Cy,
    Cz,
    /// Fixed controlled unitaries.
    Cnot,
    Cphase,
    /// Leakage rotation between two global basis-state indices.
    Lx,
}

impl Primitive {
    pub fn parse(name: &str) -> std::result::Result<Self, GrammarError> {
        match name {
            "I" => Ok(Primitive::I),
            "D" => Ok(Primitive::D),
            "X" => Ok(Primitive::X),
            "Y" => Ok(Primitive::Y),
            "Z" => Ok(Primitive::Z),
            "N" => Ok(Primitive::N),
            "CX" => Ok(Primitive::Cx),
            "CY" => Ok(Primitive::Cy),
            "CZ" => Ok(Primitive::Cz),
            "CNOT" => Ok(Primitive::Cnot),
            "CPHASE" => Ok(Primitive::Cphase),
            "LX" => Ok(Primitive::Lx),
            other => Err(GrammarError::InvalidGateName(other.to_owned())),
        }
    }
}

pub(crate) fn rx_matrix(theta: f64) -> Array2<Complex64> {
    let (sin, cos) = (theta / 2.0).sin_cos();
    array![
        [c64(cos, 0.0), c64(0.0, -sin)],
        [c64(0.0, -sin), c64(cos, 0.0)]
    ]
}

pub(crate) fn ry_matrix(theta: f64) -> Array2<Complex64> {
    let (sin, cos) = (theta / 2.0).sin_cos();
    array![
        [c64(cos, 0.0), c64(-sin, 0.0)],
        [c64(sin, 0.0), c64(cos, 0.0)]
    ]
}

pub(crate) fn rz_matrix(theta: f64) -> Array2<Complex64> {
    let ihalf = c64(0.0, 0.5 * theta);
    array![[(-ihalf).exp(), C_ZERO], [C_ZERO, ihalf.exp()]]
}

/// `exp(-i θ (cx X + cy Y + cz Z) / 2)` in closed form; the zero axis degenerates to the
/// identity.
pub(crate) fn axis_rotation_matrix(theta: f64, cx: f64, cy: f64, cz: f64) -> Array2<Complex64> {
    let norm = (cx * cx + cy * cy + cz * cz).sqrt();
    if norm == 0.0 {
        return Array2::eye(2);
    }
    let (sin, cos) = (theta * norm / 2.0).sin_cos();
    let (nx, ny, nz) = (cx / norm, cy / norm, cz / norm);
    array![
        [
            c64(cos, -sin * nz),
            c64(-sin * ny, -sin * nx)
        ],
        [
            c64(sin * ny, -sin * nx),
            c64(cos, sin * nz)
        ]
    ]
}

/// The 4×4 unitary acting as `target` on the second qubit where the first (most significant)
/// qubit is set, and as the identity elsewhere.
pub(crate) fn controlled_matrix(target: ArrayView2<Complex64>) -> Array2<Complex64> {
    let mut out: Array2<Complex64> = Array2::eye(4);
    out.slice_mut(ndarray::s![2..4, 2..4]).assign(&target);
    out
}

/// Synthesize one expression term into an embedded operator, using the strategy the caller
/// selected.
pub fn synthesize_term(
    ctx: &EmbedContext,
    term: &OpTerm,
    unitary_embedding: bool,
) -> Result<LinearOperator> {
    match Primitive::parse(&term.name)? {
        Primitive::I => {
            let labels = label_args(term, 0)?;
            let dim = ctx.labels.product_dim(&labels)?;
            if unitary_embedding {
                let local: Array2<Complex64> = Array2::eye(dim);
                embed_unitary(ctx, local.view(), &labels)
            } else {
                let local: Array2<f64> = Array2::eye(dim * dim);
                embed_process(ctx, local.view(), &labels, default_selection(ctx))
            }
        }
        Primitive::D => {
            if unitary_embedding || !ctx.parameterization.is_linear() {
                return Err(ConstructionError::DiagonalGateNotLinear);
            }
            let labels = label_args(term, 0)?;
            let dim = ctx.labels.product_dim(&labels)?;
            let first = if ctx.parameterization == Parameterization::LinearTp {
                1
            } else {
                0
            };
            let cells: Vec<(usize, usize)> = (first..dim * dim).map(|i| (i, i)).collect();
            let local: Array2<f64> = Array2::eye(dim * dim);
            embed_process(ctx, local.view(), &labels, ParamSelection::Explicit(&cells))
        }
        axis @ (Primitive::X | Primitive::Y | Primitive::Z) => {
            expect_arity(term, 2)?;
            let theta = number_arg(term, 0, false)?;
            let label = label_arg(term, 1)?;
            require_qubit(ctx, &term.name, label)?;
            let unitary = match axis {
                Primitive::X => rx_matrix(theta),
                Primitive::Y => ry_matrix(theta),
                _ => rz_matrix(theta),
            };
            embed_local(ctx, unitary.view(), &[label], unitary_embedding)
        }
        Primitive::N => {
            expect_arity(term, 5)?;
            let theta = number_arg(term, 0, true)?;
            let cx = number_arg(term, 1, true)?;
            let cy = number_arg(term, 2, true)?;
            let cz = number_arg(term, 3, true)?;
            let label = label_arg(term, 4)?;
            require_qubit(ctx, &term.name, label)?;
            let unitary = axis_rotation_matrix(theta, cx, cy, cz);
            embed_local(ctx, unitary.view(), &[label], unitary_embedding)
        }
        axis @ (Primitive::Cx | Primitive::Cy | Primitive::Cz) => {
            expect_arity(term, 3)?;
            let theta = number_arg(term, 0, false)?;
            let control = label_arg(term, 1)?;
            let target = label_arg(term, 2)?;
            require_qubit(ctx, &term.name, control)?;
            require_qubit(ctx, &term.name, target)?;
            let rotation = match axis {
                Primitive::Cx => rx_matrix(theta),
                Primitive::Cy => ry_matrix(theta),
                _ => rz_matrix(theta),
            };
            let unitary = controlled_matrix(rotation.view());
            embed_local(ctx, unitary.view(), &[control, target], unitary_embedding)
        }
        fixed @ (Primitive::Cnot | Primitive::Cphase) => {
            expect_arity(term, 2)?;
            let control = label_arg(term, 0)?;
            let target = label_arg(term, 1)?;
            require_qubit(ctx, &term.name, control)?;
            require_qubit(ctx, &term.name, target)?;
            let flip = match fixed {
                Primitive::Cnot => array![[C_ZERO, C_ONE], [C_ONE, C_ZERO]],
                _ => array![[C_ONE, C_ZERO], [C_ZERO, -C_ONE]],
            };
            let unitary = controlled_matrix(flip.view());
            embed_local(ctx, unitary.view(), &[control, target], unitary_embedding)
        }
        Primitive::Lx => {
            expect_arity(term, 3)?;
            let theta = number_arg(term, 0, false)?;
            let i1 = index_arg(term, 1)?;
            let i2 = index_arg(term, 2)?;
            leakage_rotation(ctx, theta, i1, i2)
        }
    }
}

/// The parameter selection a non-`D` primitive gets by default.
fn default_selection(ctx: &EmbedContext) -> ParamSelection<'static> {
    if ctx.parameterization == Parameterization::LinearTp {
        ParamSelection::TpRows
    } else {
        ParamSelection::All
    }
}

/// Embed a subsystem-local unitary via the requested strategy.  The direct path lifts to the
/// process matrix and rotates it to the (real) Pauli-product basis first.
fn embed_local(
    ctx: &EmbedContext,
    unitary: ArrayView2<Complex64>,
    labels: &[&str],
    unitary_embedding: bool,
) -> Result<LinearOperator> {
    if unitary_embedding {
        return embed_unitary(ctx, unitary, labels);
    }
    let process = unitary_to_process(unitary);
    let dim = unitary.nrows();
    let std_local = Basis::single("std", dim)?;
    let pp_local = Basis::single("pp", dim)?;
    let local_pp = to_real_checked(
        change_basis(process.view(), &std_local, &pp_local)?.view(),
        IMAG_TOL,
    )?;
    embed_process(ctx, local_pp.view(), labels, default_selection(ctx))
}

/// Build the leakage primitive: an X-type rotation between two basis states of the full state
/// space, contracted onto the block-diagonal space (which discards the cross-block coherences —
/// the promised decoherence) and expressed in the target basis, always fully parameterized.
fn leakage_rotation(
    ctx: &EmbedContext,
    theta: f64,
    i1: usize,
    i2: usize,
) -> Result<LinearOperator> {
    let dm_dim = ctx.labels.dm_dim();
    for index in [i1, i2] {
        if index >= dm_dim {
            return Err(ConstructionError::StateIndexOutOfRange {
                index,
                dim: dm_dim,
            });
        }
    }
    let rotation = rx_matrix(theta);
    let mut total: Array2<Complex64> = Array2::eye(dm_dim);
    total[[i1, i1]] = rotation[[0, 0]];
    total[[i1, i2]] = rotation[[0, 1]];
    total[[i2, i1]] = rotation[[1, 0]];
    total[[i2, i2]] = rotation[[1, 1]];

    let process = unitary_to_process(total.view());
    let reduced = resize_mx(process.view(), ctx.basis.block_dims(), ResizeMode::Contract)?;
    let std = Basis::new("std", ctx.basis.block_dims())?;
    let in_target = change_basis(reduced.view(), &std, ctx.basis)?;
    Ok(LinearOperator::Full(FullOp::new(
        in_target,
        ctx.basis.is_real(),
    )?))
}

fn expect_arity(term: &OpTerm, expected: usize) -> std::result::Result<(), GrammarError> {
    if term.args.len() != expected {
        return Err(GrammarError::WrongArgumentCount {
            gate: term.name.clone(),
            expected,
            found: term.args.len(),
        });
    }
    Ok(())
}

fn label_arg<'a>(term: &'a OpTerm, position: usize) -> std::result::Result<&'a str, GrammarError> {
    term.args[position]
        .as_label()
        .ok_or_else(|| GrammarError::ExpectedLabel {
            gate: term.name.clone(),
            position,
        })
}

/// Every argument from `first` onward, as labels.
fn label_args<'a>(
    term: &'a OpTerm,
    first: usize,
) -> std::result::Result<SmallVec<[&'a str; 2]>, GrammarError> {
    (first..term.args.len()).map(|i| label_arg(term, i)).collect()
}

fn number_arg(
    term: &OpTerm,
    position: usize,
    allow_sqrt: bool,
) -> std::result::Result<f64, GrammarError> {
    let expr = term.args[position]
        .as_expr()
        .ok_or_else(|| GrammarError::ExpectedNumber {
            gate: term.name.clone(),
            position,
        })?;
    expr.evaluate(allow_sqrt)
}

fn index_arg(term: &OpTerm, position: usize) -> std::result::Result<usize, GrammarError> {
    let value = number_arg(term, position, false)?;
    if value < 0.0 || (value - value.round()).abs() > 1e-9 {
        return Err(GrammarError::ExpectedInteger {
            gate: term.name.clone(),
            position,
        });
    }
    Ok(value.round() as usize)
}

fn require_qubit(ctx: &EmbedContext, gate: &str, label: &str) -> Result<()> {
    let dim = ctx.labels.label_dim(label)?;
    if dim != 2 {
        return Err(ConstructionError::NotATwoLevelSystem {
            gate: gate.to_owned(),
            label: label.to_owned(),
            dim,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_norm_diff(a: ArrayView2<Complex64>, b: ArrayView2<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0_f64, f64::max)
    }

    #[test]
    fn rotations_compose_like_their_angles() {
        let quarter = rx_matrix(std::f64::consts::FRAC_PI_2);
        let half = rx_matrix(std::f64::consts::PI);
        assert!(max_norm_diff(quarter.dot(&quarter).view(), half.view()) < 1e-12);
    }

    #[test]
    fn axis_rotation_specializes_to_the_pauli_axes() {
        let theta = 0.7;
        for (axis, expected) in [
            ((1.0, 0.0, 0.0), rx_matrix(theta)),
            ((0.0, 1.0, 0.0), ry_matrix(theta)),
            ((0.0, 0.0, 1.0), rz_matrix(theta)),
        ] {
            let general = axis_rotation_matrix(theta, axis.0, axis.1, axis.2);
            assert!(max_norm_diff(general.view(), expected.view()) < 1e-12);
        }
    }

    #[test]
    fn cnot_unitary_flips_where_the_control_is_set() {
        let flip = array![[C_ZERO, C_ONE], [C_ONE, C_ZERO]];
        let cnot = controlled_matrix(flip.view());
        for (input, output) in [(0usize, 0usize), (1, 1), (2, 3), (3, 2)] {
            assert_eq!(cnot[[output, input]], C_ONE);
        }
    }

    #[test]
    fn unknown_names_are_grammar_errors() {
        assert!(matches!(
            Primitive::parse("FOO"),
            Err(GrammarError::InvalidGateName(_))
        ));
    }
}
