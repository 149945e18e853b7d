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

//! Bases for the space of block-diagonal density matrices, and the transforms between them.
//!
//! A basis over block dimensions `[d1, d2, ...]` supplies `d1² + d2² + ...` matrices, grouped per
//! block.  The "reduced standard" coordinates — within-block matrix units, blocks concatenated in
//! order, row-major inside each block — are the common currency: every basis knows the matrix
//! whose columns are the row-major vectorizations of its elements, and a change of basis is the
//! per-block direct sum of `S_to⁻¹ · S_from`.  Orthonormality is not assumed (the qutrit basis is
//! built by projection and is merely linearly independent), so the inverse is computed rather
//! than daggered.
//!
//! The built-in bases:
//!
//! * `std` — matrix units; complex coefficients for Hermitian matrices.
//! * `gm` — normalized Gell-Mann matrices; Hermitian and traceless apart from the identity, so
//!   Hermitian matrices get real coefficients.
//! * `pp` — normalized Pauli products, defined for power-of-two dimensions, first label most
//!   significant; real for the same reason.
//! * `qt` — the qutrit basis: two-qubit Pauli products conjugated onto the symmetric (spin-1)
//!   subspace and renormalized; real.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;

use crate::error::{ConstructionError, Result};
use crate::superop::{c64, invert, kron, C_ONE, C_ZERO};

/// Frobenius weight above which a contraction's discarded off-block entries are reported.
pub const CONTRACT_TOL: f64 = 1e-8;

/// A named basis over a block-diagonal density-matrix space.
#[derive(Clone, Debug)]
pub struct Basis {
    name: String,
    block_dims: Vec<usize>,
    blocks: Vec<Vec<Array2<Complex64>>>,
    real: bool,
}

impl Basis {
    /// Build a named basis over the given block dimensions.
    pub fn new(name: &str, block_dims: &[usize]) -> Result<Self> {
        let blocks = block_dims
            .iter()
            .map(|&dim| build_elements(name, dim))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_owned(),
            block_dims: block_dims.to_vec(),
            blocks,
            real: matches!(name, "gm" | "pp" | "qt"),
        })
    }

    /// Build a named basis over a single dense block.
    pub fn single(name: &str, dim: usize) -> Result<Self> {
        Self::new(name, &[dim])
    }

    /// The conventional automatic choice: Pauli products when the space is a single
    /// power-of-two block, the qutrit basis when it is a single three-level block, and
    /// Gell-Mann otherwise.
    pub fn auto(block_dims: &[usize]) -> Result<Self> {
        let name = match block_dims {
            [dim] if dim.is_power_of_two() => "pp",
            [3] => "qt",
            _ => "gm",
        };
        Self::new(name, block_dims)
    }

    /// Build a custom basis from per-block element lists.  `real` declares whether Hermitian
    /// matrices take real coefficients in this basis; it gates the real-casting steps downstream.
    pub fn custom(
        name: &str,
        blocks: Vec<Vec<Array2<Complex64>>>,
        real: bool,
    ) -> Result<Self> {
        let mut block_dims = Vec::with_capacity(blocks.len());
        for elements in &blocks {
            let dim = match elements.first() {
                Some(first) => first.nrows(),
                None => {
                    return Err(ConstructionError::InvalidBasis(
                        "a basis block has no elements".into(),
                    ))
                }
            };
            if elements.len() != dim * dim
                || elements.iter().any(|el| el.dim() != (dim, dim))
            {
                return Err(ConstructionError::InvalidBasis(format!(
                    "a block of dimension {dim} needs {} elements of shape {dim}x{dim}",
                    dim * dim
                )));
            }
            block_dims.push(dim);
        }
        Ok(Self {
            name: name.to_owned(),
            block_dims,
            blocks,
            real,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether Hermitian-preserving superoperators are real-valued in this basis.
    pub fn is_real(&self) -> bool {
        self.real
    }

    pub fn block_dims(&self) -> &[usize] {
        &self.block_dims
    }

    /// Dimension of the density matrix (sum of block dimensions).
    pub fn dm_dim(&self) -> usize {
        self.block_dims.iter().sum()
    }

    /// Dimension of superoperators over this space (sum of squared block dimensions).
    pub fn superop_dim(&self) -> usize {
        self.block_dims.iter().map(|d| d * d).sum()
    }

    pub(crate) fn block_elements(&self, block: usize) -> &[Array2<Complex64>] {
        &self.blocks[block]
    }

    /// The vectorization matrix of a single block, taking that block's coefficient vectors to
    /// its within-block matrix-unit coordinates.
    pub(crate) fn block_to_std(&self, block: usize) -> Array2<Complex64> {
        vectorize_elements(&self.blocks[block])
    }

    /// The matrix taking coefficient vectors in this basis to reduced-standard coordinates,
    /// as the direct sum of the per-block vectorization matrices.
    pub fn to_std_transform(&self) -> Array2<Complex64> {
        let dim = self.superop_dim();
        let mut out = Array2::zeros((dim, dim));
        let mut offset = 0;
        for elements in &self.blocks {
            let size = elements.len();
            let block = vectorize_elements(elements);
            out.slice_mut(ndarray::s![offset..offset + size, offset..offset + size])
                .assign(&block);
            offset += size;
        }
        out
    }

    /// The matrix taking coefficient vectors in this basis to coefficient vectors in `other`.
    /// Composing `transform_matrix_to(b)` with `b.transform_matrix_to(self)` is the identity to
    /// numerical tolerance.
    pub fn transform_matrix_to(&self, other: &Basis) -> Result<Array2<Complex64>> {
        if self.block_dims != other.block_dims {
            return Err(ConstructionError::IncompatibleBases {
                from: self.name.clone(),
                to: other.name.clone(),
                from_dims: self.block_dims.clone(),
                to_dims: other.block_dims.clone(),
            });
        }
        let dim = self.superop_dim();
        let mut out = Array2::zeros((dim, dim));
        let mut offset = 0;
        for (ours, theirs) in self.blocks.iter().zip(other.blocks.iter()) {
            let size = ours.len();
            let to_std = vectorize_elements(ours);
            let from_std = invert(vectorize_elements(theirs).view())?;
            out.slice_mut(ndarray::s![offset..offset + size, offset..offset + size])
                .assign(&from_std.dot(&to_std));
            offset += size;
        }
        Ok(out)
    }
}

/// Columns are the row-major vectorizations of the elements.
fn vectorize_elements(elements: &[Array2<Complex64>]) -> Array2<Complex64> {
    let size = elements.len();
    let mut out = Array2::zeros((size, size));
    for (col, element) in elements.iter().enumerate() {
        for (row, value) in element.iter().enumerate() {
            out[[row, col]] = *value;
        }
    }
    out
}

/// Apply a similarity change of basis to a square matrix expressed in `from`, producing its
/// representation in `to`.  The bases must share a block structure.
pub fn change_basis(
    mx: ArrayView2<Complex64>,
    from: &Basis,
    to: &Basis,
) -> Result<Array2<Complex64>> {
    let dim = from.superop_dim();
    if mx.dim() != (dim, dim) {
        return Err(ConstructionError::MatrixDimension {
            expected: dim,
            found: mx.nrows(),
            context: "to change basis",
        });
    }
    let forward = from.transform_matrix_to(to)?;
    let backward = to.transform_matrix_to(from)?;
    Ok(forward.dot(&mx).dot(&backward))
}

/// The vector counterpart of [change_basis]: coefficient vectors transform by plain
/// multiplication.
pub fn change_basis_vec(
    vec: ArrayView1<Complex64>,
    from: &Basis,
    to: &Basis,
) -> Result<Array1<Complex64>> {
    let dim = from.superop_dim();
    if vec.len() != dim {
        return Err(ConstructionError::MatrixDimension {
            expected: dim,
            found: vec.len(),
            context: "to change basis",
        });
    }
    let forward = from.transform_matrix_to(to)?;
    Ok(forward.dot(&vec))
}

/// Direction of a [resize_mx] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeMode {
    /// Dense matrix-unit basis over the whole space → reduced block-diagonal basis.  Entries at
    /// cross-block matrix units are dropped, not summed; nonzero weight there is discarded (and
    /// reported through `tracing` when it exceeds [CONTRACT_TOL]).
    Contract,
    /// The exact inverse of `Contract`: reinsert zero rows and columns at the removed positions.
    Expand,
}

/// Map a superoperator between the dense matrix-unit basis of the full `(Σdᵢ)`-dimensional
/// Hilbert space and the reduced basis containing only within-block matrix units.
pub fn resize_mx(
    mx: ArrayView2<Complex64>,
    block_dims: &[usize],
    mode: ResizeMode,
) -> Result<Array2<Complex64>> {
    let dm_dim: usize = block_dims.iter().sum();
    let dense_dim = dm_dim * dm_dim;
    let reduced_dim: usize = block_dims.iter().map(|d| d * d).sum();

    // The dense row-major index of each kept matrix unit, in reduced order.
    let mut kept = Vec::with_capacity(reduced_dim);
    let mut start = 0;
    for &dim in block_dims {
        for i in 0..dim {
            for j in 0..dim {
                kept.push((start + i) * dm_dim + (start + j));
            }
        }
        start += dim;
    }

    match mode {
        ResizeMode::Contract => {
            if mx.dim() != (dense_dim, dense_dim) {
                return Err(ConstructionError::MatrixDimension {
                    expected: dense_dim,
                    found: mx.nrows(),
                    context: "to contract",
                });
            }
            let mut out = Array2::zeros((reduced_dim, reduced_dim));
            for (r, &dense_r) in kept.iter().enumerate() {
                for (c, &dense_c) in kept.iter().enumerate() {
                    out[[r, c]] = mx[[dense_r, dense_c]];
                }
            }
            let total: f64 = mx.iter().map(|x| x.norm_sqr()).sum();
            let retained: f64 = out.iter().map(|x| x.norm_sqr()).sum();
            let discarded = (total - retained).max(0.0).sqrt();
            if discarded > CONTRACT_TOL {
                tracing::warn!(
                    discarded_weight = discarded,
                    "contraction discarded nonzero cross-block weight"
                );
            }
            Ok(out)
        }
        ResizeMode::Expand => {
            if mx.dim() != (reduced_dim, reduced_dim) {
                return Err(ConstructionError::MatrixDimension {
                    expected: reduced_dim,
                    found: mx.nrows(),
                    context: "to expand",
                });
            }
            let mut out = Array2::zeros((dense_dim, dense_dim));
            for (r, &dense_r) in kept.iter().enumerate() {
                for (c, &dense_c) in kept.iter().enumerate() {
                    out[[dense_r, dense_c]] = mx[[r, c]];
                }
            }
            Ok(out)
        }
    }
}

fn build_elements(name: &str, dim: usize) -> Result<Vec<Array2<Complex64>>> {
    match name {
        "std" => Ok(std_matrices(dim)),
        "gm" => Ok(gm_matrices(dim)),
        "pp" => pp_matrices(dim),
        "qt" => qt_matrices(dim),
        other => Err(ConstructionError::UnknownBasis(other.to_owned())),
    }
}

/// Matrix units `E_ij`, row index varying slowest.
fn std_matrices(dim: usize) -> Vec<Array2<Complex64>> {
    let mut out = Vec::with_capacity(dim * dim);
    for i in 0..dim {
        for j in 0..dim {
            let mut mx = Array2::zeros((dim, dim));
            mx[[i, j]] = C_ONE;
            out.push(mx);
        }
    }
    out
}

/// Normalized Gell-Mann matrices: the scaled identity, then for each `k < j` the symmetric and
/// antisymmetric off-diagonal pair, then the diagonal ladder.  Every element has unit Frobenius
/// norm.
fn gm_matrices(dim: usize) -> Vec<Array2<Complex64>> {
    let mut out = Vec::with_capacity(dim * dim);
    let mut identity: Array2<Complex64> = Array2::eye(dim);
    identity.mapv_inplace(|x| x / c64((dim as f64).sqrt(), 0.0));
    out.push(identity);
    let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    for k in 0..dim {
        for j in (k + 1)..dim {
            let mut sym = Array2::zeros((dim, dim));
            sym[[k, j]] = c64(inv_sqrt2, 0.0);
            sym[[j, k]] = c64(inv_sqrt2, 0.0);
            out.push(sym);
            let mut asym = Array2::zeros((dim, dim));
            asym[[k, j]] = c64(0.0, -inv_sqrt2);
            asym[[j, k]] = c64(0.0, inv_sqrt2);
            out.push(asym);
        }
    }
    for l in 1..dim {
        let norm = 1.0 / ((l * (l + 1)) as f64).sqrt();
        let mut diag = Array2::zeros((dim, dim));
        for m in 0..l {
            diag[[m, m]] = c64(norm, 0.0);
        }
        diag[[l, l]] = c64(-(l as f64) * norm, 0.0);
        out.push(diag);
    }
    out
}

/// Normalized Pauli-product matrices for a power-of-two dimension, ordered with the first
/// (leftmost) factor most significant: `II, IX, IY, IZ, XI, ...` for two qubits.
fn pp_matrices(dim: usize) -> Result<Vec<Array2<Complex64>>> {
    if !dim.is_power_of_two() {
        return Err(ConstructionError::InvalidBasis(format!(
            "the Pauli-product basis needs a power-of-two dimension, got {dim}"
        )));
    }
    let s = c64(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    let is = c64(0.0, std::f64::consts::FRAC_1_SQRT_2);
    let factors: [Array2<Complex64>; 4] = [
        ndarray::array![[s, C_ZERO], [C_ZERO, s]],
        ndarray::array![[C_ZERO, s], [s, C_ZERO]],
        ndarray::array![[C_ZERO, -is], [is, C_ZERO]],
        ndarray::array![[s, C_ZERO], [C_ZERO, -s]],
    ];
    let mut out = vec![Array2::from_elem((1, 1), C_ONE)];
    let mut size = 1;
    while size < dim {
        out = out
            .iter()
            .flat_map(|left| factors.iter().map(|right| kron(left.view(), right.view())))
            .collect();
        size *= 2;
    }
    Ok(out)
}

/// The qutrit basis: two-qubit Pauli products conjugated by the isometry onto the symmetric
/// (spin-1) subspace, in the conventional selection and order, renormalized to unit Frobenius
/// norm.  The result is Hermitian and linearly independent but not orthogonal, which is why
/// transforms are built with an explicit inverse.
fn qt_matrices(dim: usize) -> Result<Vec<Array2<Complex64>>> {
    if dim != 3 {
        return Err(ConstructionError::InvalidBasis(format!(
            "the qutrit basis is only defined for dimension 3, got {dim}"
        )));
    }
    let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    // Rows are |00>, (|01> + |10>)/sqrt(2), |11>.
    let mut isometry: Array2<Complex64> = Array2::zeros((3, 4));
    isometry[[0, 0]] = C_ONE;
    isometry[[1, 1]] = c64(inv_sqrt2, 0.0);
    isometry[[1, 2]] = c64(inv_sqrt2, 0.0);
    isometry[[2, 3]] = C_ONE;
    let isometry_t = isometry.t().to_owned();

    let two_qubit = pp_matrices(4)?;
    // II, XX, YY, YZ, IX, IY, IZ, XY, XZ.
    const SELECTED: [usize; 9] = [0, 5, 10, 11, 1, 2, 3, 6, 7];
    let mut out = Vec::with_capacity(9);
    for &index in SELECTED.iter() {
        let projected = isometry.dot(&two_qubit[index]).dot(&isometry_t);
        let norm: f64 = projected.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        out.push(projected.mapv(|x| x / c64(norm, 0.0)));
    }
    Ok(out)
}
