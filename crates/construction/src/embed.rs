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

//! Lifting a locally defined operator into the full composite-space superoperator.  Two
//! interchangeable strategies exist, selected by the caller:
//!
//! * [embed_unitary] works on the state space: it builds the owning block's unitary by copying
//!   local entries wherever the non-acted tensor factors match, lifts it with `U ⊗ U*`, and drops
//!   the resulting block at its diagonal offset in the superoperator identity.  It has no way to
//!   track which output entries came from which local entries, so it is only available for the
//!   `full` parameterization.
//! * [embed_process] works on the vectorized density-matrix space: the local operator is already
//!   a (real) Pauli-product-basis process matrix, every local entry is copied to one global
//!   position per configuration of the non-acted factors, and those positions are recorded
//!   per parameter as they are written, which is exactly the bookkeeping the linear
//!   parameterizations need.  The touched block is then conjugated from `pp` to the target basis.
//!
//! Both take the context as an explicit value; everything an embedding needs to know travels in
//! its arguments.

use itertools::Itertools;
use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;

use crate::basis::{change_basis, Basis};
use crate::error::{ConstructionError, Result};
use crate::operation::{FullOp, LinearOp, LinearOperator, StaticOp, TpOp};
use crate::statespace::StateSpaceLabels;
use crate::superop::{to_complex, to_real_checked, unitary_to_process, IMAG_TOL};

/// The parameterization schemes an operator can be built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameterization {
    Full,
    Tp,
    Static,
    Linear,
    LinearTp,
}

impl Parameterization {
    pub fn is_linear(&self) -> bool {
        matches!(self, Parameterization::Linear | Parameterization::LinearTp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameterization::Full => "full",
            Parameterization::Tp => "TP",
            Parameterization::Static => "static",
            Parameterization::Linear => "linear",
            Parameterization::LinearTp => "linearTP",
        }
    }
}

impl std::str::FromStr for Parameterization {
    type Err = ConstructionError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "full" => Ok(Parameterization::Full),
            "TP" => Ok(Parameterization::Tp),
            "static" => Ok(Parameterization::Static),
            "linear" => Ok(Parameterization::Linear),
            "linearTP" => Ok(Parameterization::LinearTp),
            other => Err(ConstructionError::UnknownParameterization(other.to_owned())),
        }
    }
}

impl std::fmt::Display for Parameterization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an embedding needs to know, passed by value rather than captured.
#[derive(Clone, Copy, Debug)]
pub struct EmbedContext<'a> {
    pub labels: &'a StateSpaceLabels,
    pub basis: &'a Basis,
    pub parameterization: Parameterization,
}

impl<'a> EmbedContext<'a> {
    pub fn new(
        labels: &'a StateSpaceLabels,
        basis: &'a Basis,
        parameterization: Parameterization,
    ) -> Result<Self> {
        if labels.block_dims() != basis.block_dims() {
            return Err(ConstructionError::StateSpaceMismatch {
                labels: labels.block_dims().to_vec(),
                basis: basis.block_dims().to_vec(),
            });
        }
        Ok(Self {
            labels,
            basis,
            parameterization,
        })
    }

    /// The tensor-product block owning every acted label, or an error if they straddle blocks.
    fn owning_block(&self, acted: &[&str]) -> Result<usize> {
        let mut block = None;
        for &label in acted {
            let this = self.labels.block_of(label)?;
            match block {
                None => block = Some(this),
                Some(first) if first != this => {
                    return Err(ConstructionError::MultiBlockGate {
                        labels: acted.iter().map(|&l| l.to_owned()).collect(),
                    })
                }
                Some(_) => {}
            }
        }
        // The caller always supplies at least one label.
        Ok(block.unwrap())
    }

    /// Offset of a block's basis elements within the reduced superoperator coordinates.
    fn block_offset(&self, block: usize) -> usize {
        self.labels.block_dims()[..block].iter().map(|d| d * d).sum()
    }
}

/// Which local matrix entries become free parameters of a direct embedding.
#[derive(Clone, Copy, Debug)]
pub enum ParamSelection<'a> {
    /// Every local entry, flattened row-major.
    All,
    /// Every local entry outside the first row (the trace-preservation row stays fixed).
    TpRows,
    /// Exactly the listed `(row, col)` local entries, in order.
    Explicit(&'a [(usize, usize)]),
}

impl ParamSelection<'_> {
    fn count(&self, rows: usize, cols: usize) -> usize {
        match self {
            ParamSelection::All => rows * cols,
            ParamSelection::TpRows => (rows - 1) * cols,
            ParamSelection::Explicit(cells) => cells.len(),
        }
    }

    fn param_of(&self, row: usize, col: usize, cols: usize) -> Option<usize> {
        match self {
            ParamSelection::All => Some(row * cols + col),
            ParamSelection::TpRows => {
                if row > 0 {
                    Some((row - 1) * cols + col)
                } else {
                    None
                }
            }
            ParamSelection::Explicit(cells) => {
                cells.iter().position(|&cell| cell == (row, col))
            }
        }
    }
}

/// Embed a local *unitary* (standard state basis) as a fully parameterized superoperator.
pub fn embed_unitary(
    ctx: &EmbedContext,
    local: ArrayView2<Complex64>,
    acted: &[&str],
) -> Result<LinearOperator> {
    if ctx.parameterization != Parameterization::Full {
        return Err(ConstructionError::UnitaryEmbeddingNotFull(
            ctx.parameterization.to_string(),
        ));
    }
    let block = ctx.owning_block(acted)?;
    let block_labels = ctx.labels.block_labels(block);

    let acted_positions = acted
        .iter()
        .map(|&label| ctx.labels.index_within_block(label))
        .collect::<Result<Vec<_>>>()?;
    // Row-major strides of the acted labels within the local unitary.
    let mut local_strides = vec![0usize; acted.len()];
    let mut local_dim = 1;
    for (i, &label) in acted.iter().enumerate().rev() {
        local_strides[i] = local_dim;
        local_dim *= ctx.labels.label_dim(label)?;
    }
    if local.dim() != (local_dim, local_dim) {
        return Err(ConstructionError::MatrixDimension {
            expected: local_dim,
            found: local.nrows(),
            context: "to embed a local unitary",
        });
    }

    // All state configurations of the owning block, first label slowest.
    let member_dims = block_labels
        .iter()
        .map(|label| ctx.labels.label_dim(label))
        .collect::<Result<Vec<_>>>()?;
    let configs: Vec<Vec<usize>> = member_dims
        .iter()
        .map(|&dim| 0..dim)
        .multi_cartesian_product()
        .collect();
    let block_dim = ctx.labels.block_dims()[block];

    let mut block_unitary: Array2<Complex64> = Array2::eye(block_dim);
    for (i, b1) in configs.iter().enumerate() {
        for (j, b2) in configs.iter().enumerate() {
            let spectator_match = (0..block_labels.len())
                .filter(|pos| !acted_positions.contains(pos))
                .all(|pos| b1[pos] == b2[pos]);
            if spectator_match {
                let local_row: usize = acted_positions
                    .iter()
                    .zip(&local_strides)
                    .map(|(&pos, &stride)| b1[pos] * stride)
                    .sum();
                let local_col: usize = acted_positions
                    .iter()
                    .zip(&local_strides)
                    .map(|(&pos, &stride)| b2[pos] * stride)
                    .sum();
                block_unitary[[i, j]] = local[[local_row, local_col]];
            }
        }
    }

    let process = unitary_to_process(block_unitary.view());
    let offset = ctx.block_offset(block);
    let size = block_dim * block_dim;
    let mut full: Array2<Complex64> = Array2::eye(ctx.basis.superop_dim());
    full.slice_mut(s![offset..offset + size, offset..offset + size])
        .assign(&process);

    let std = Basis::new("std", ctx.basis.block_dims())?;
    let in_target = change_basis(full.view(), &std, ctx.basis)?;
    Ok(LinearOperator::Full(FullOp::new(
        in_target,
        ctx.basis.is_real(),
    )?))
}

/// Embed a local *process matrix in the Pauli-product basis* by direct basis-element insertion,
/// recording the parameter-to-coordinate association as entries are placed.
pub fn embed_process(
    ctx: &EmbedContext,
    local: ArrayView2<f64>,
    acted: &[&str],
    selection: ParamSelection,
) -> Result<LinearOperator> {
    let block = ctx.owning_block(acted)?;
    let block_labels = ctx.labels.block_labels(block);

    // Density-matrix-space sizes of each tensor component of the block: a d-level subsystem
    // contributes d² basis elements.
    let component_sizes: Vec<usize> = block_labels
        .iter()
        .map(|label| ctx.labels.label_dim(label))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .map(|dim| dim * dim)
        .collect();
    let mut component_strides = vec![0usize; component_sizes.len()];
    let mut block_size = 1;
    for (i, &size) in component_sizes.iter().enumerate().rev() {
        component_strides[i] = block_size;
        block_size *= size;
    }

    let acted_positions = acted
        .iter()
        .map(|&label| ctx.labels.index_within_block(label))
        .collect::<Result<Vec<_>>>()?;
    let acted_sizes: Vec<usize> = acted_positions
        .iter()
        .map(|&pos| component_sizes[pos])
        .collect();
    let mut acted_strides = vec![0usize; acted_sizes.len()];
    let mut local_dim = 1;
    for (i, &size) in acted_sizes.iter().enumerate().rev() {
        acted_strides[i] = local_dim;
        local_dim *= size;
    }
    if local.dim() != (local_dim, local_dim) {
        return Err(ConstructionError::MatrixDimension {
            expected: local_dim,
            found: local.nrows(),
            context: "to embed a local process matrix",
        });
    }

    let spectator_positions: Vec<usize> = (0..block_labels.len())
        .filter(|pos| !acted_positions.contains(pos))
        .collect();
    let spectator_configs: Vec<Vec<usize>> = if spectator_positions.is_empty() {
        vec![vec![]]
    } else {
        spectator_positions
            .iter()
            .map(|&pos| 0..component_sizes[pos])
            .multi_cartesian_product()
            .collect()
    };

    // Decompose a local (Pauli-product) index into one index per acted component.
    let decompose = |index: usize| -> Vec<usize> {
        acted_strides
            .iter()
            .zip(&acted_sizes)
            .map(|(&stride, &size)| (index / stride) % size)
            .collect()
    };
    // Global within-block index of a full component configuration.
    let compose = |acted_part: &[usize], spectator_part: &[usize]| -> usize {
        let mut index = 0;
        for (value, &pos) in acted_part.iter().zip(&acted_positions) {
            index += value * component_strides[pos];
        }
        for (value, &pos) in spectator_part.iter().zip(&spectator_positions) {
            index += value * component_strides[pos];
        }
        index
    };

    let offset = ctx.block_offset(block);
    let mut block_op: Array2<f64> = Array2::eye(block_size);
    let mut map: Vec<Vec<(usize, usize)>> =
        vec![Vec::new(); selection.count(local.nrows(), local.ncols())];
    for op_i in 0..local.nrows() {
        let out_acted = decompose(op_i);
        for op_j in 0..local.ncols() {
            let in_acted = decompose(op_j);
            let param = selection.param_of(op_i, op_j, local.ncols());
            for spectator in &spectator_configs {
                let out_index = compose(&out_acted, spectator);
                let in_index = compose(&in_acted, spectator);
                block_op[[out_index, in_index]] = local[[op_i, op_j]];
                if let Some(param) = param {
                    map[param].push((offset + out_index, offset + in_index));
                }
            }
        }
    }

    let superop_dim = ctx.basis.superop_dim();
    let mut base: Array2<f64> = Array2::eye(superop_dim);
    base.slice_mut(s![offset..offset + block_size, offset..offset + block_size])
        .assign(&block_op);

    // Conjugate the touched block from the Pauli-product basis into the target basis; outside
    // the block the transform is the identity, since the identity superoperator looks the same
    // in every basis here.
    let tensor_dim = ctx.labels.block_dims()[block];
    let pp_block = Basis::single("pp", tensor_dim)?;
    let s_pp = pp_block.block_to_std(0);
    let s_target = ctx.basis.block_to_std(block);
    let pp_to_target = crate::superop::invert(s_target.view())?.dot(&s_pp);
    let target_to_pp = crate::superop::invert(s_pp.view())?.dot(&s_target);

    let mut pre: Array2<Complex64> = Array2::eye(superop_dim);
    pre.slice_mut(s![offset..offset + block_size, offset..offset + block_size])
        .assign(&pp_to_target);
    let mut post: Array2<Complex64> = Array2::eye(superop_dim);
    post.slice_mut(s![offset..offset + block_size, offset..offset + block_size])
        .assign(&target_to_pp);

    let in_target = pre.dot(&to_complex(base.view())).dot(&post);

    match ctx.parameterization {
        Parameterization::Full => Ok(LinearOperator::Full(FullOp::new(
            in_target,
            ctx.basis.is_real(),
        )?)),
        Parameterization::Static => Ok(LinearOperator::Static(StaticOp::new(
            in_target,
            ctx.basis.is_real(),
        )?)),
        Parameterization::Tp => {
            if !ctx.basis.is_real() {
                return Err(ConstructionError::TpRequiresRealBasis(
                    ctx.basis.name().to_owned(),
                ));
            }
            Ok(LinearOperator::Tp(TpOp::new(to_real_checked(
                in_target.view(),
                IMAG_TOL,
            )?)?))
        }
        Parameterization::Linear | Parameterization::LinearTp => {
            Ok(LinearOperator::Linear(LinearOp::new(
                base,
                map,
                Some(pre),
                Some(post),
                ctx.basis.is_real(),
            )?))
        }
    }
}
