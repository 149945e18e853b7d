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

//! Small dense-linear-algebra helpers shared across the construction pipeline.  The vectorization
//! convention is fixed here once and relied on everywhere: density matrices vectorize by
//! concatenating *rows*, so the state-evolution lift of a unitary is `U ⊗ U*`.

use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;

use crate::error::{ConstructionError, Result};

/// Tolerance below which imaginary parts are considered numerical noise and may be scrubbed when
/// casting a matrix to a real representation.
pub const IMAG_TOL: f64 = 1e-8;

pub(crate) const C_ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const C_ONE: Complex64 = Complex64::new(1.0, 0.0);

#[inline]
pub(crate) fn c64(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// The Kronecker product of two dense complex matrices.
pub fn kron(a: ArrayView2<Complex64>, b: ArrayView2<Complex64>) -> Array2<Complex64> {
    let (a_rows, a_cols) = a.dim();
    let (b_rows, b_cols) = b.dim();
    let mut out = Array2::zeros((a_rows * b_rows, a_cols * b_cols));
    for i in 0..a_rows {
        for j in 0..a_cols {
            let scale = a[[i, j]];
            out.slice_mut(s![i * b_rows..(i + 1) * b_rows, j * b_cols..(j + 1) * b_cols])
                .assign(&b.mapv(|x| scale * x));
        }
    }
    out
}

/// Lift a unitary on the state space to the superoperator acting on vectorized density matrices:
/// `vec(U rho U†) = (U ⊗ U*) vec(rho)` under row-major vectorization.
pub fn unitary_to_process(u: ArrayView2<Complex64>) -> Array2<Complex64> {
    let conj = u.mapv(|x| x.conj());
    kron(u, conj.view())
}

/// Cast a numerically real complex matrix to `f64`, failing if any entry carries imaginary weight
/// above `tol`.
pub fn to_real_checked(mx: ArrayView2<Complex64>, tol: f64) -> Result<Array2<f64>> {
    let worst = mx
        .iter()
        .map(|x| x.im.abs())
        .fold(0.0_f64, f64::max);
    if worst > tol {
        return Err(ConstructionError::ResidualImaginary(worst));
    }
    Ok(mx.mapv(|x| x.re))
}

/// Promote a real matrix into the complex arrays the basis-change machinery works in.
pub fn to_complex(mx: ArrayView2<f64>) -> Array2<Complex64> {
    mx.mapv(|x| c64(x, 0.0))
}

/// Invert a dense complex matrix, failing on (numerical) singularity.  Basis-transform matrices
/// are the only inputs, so singularity means a degenerate custom basis rather than bad luck.
pub(crate) fn invert(mx: ArrayView2<Complex64>) -> Result<Array2<Complex64>> {
    let n = mx.nrows();
    let dense = nalgebra::DMatrix::from_fn(n, n, |r, c| mx[[r, c]]);
    let inverse = dense
        .try_inverse()
        .ok_or_else(|| ConstructionError::InvalidBasis("vectorized elements are singular".into()))?;
    Ok(Array2::from_shape_fn((n, n), |(r, c)| inverse[(r, c)]))
}
