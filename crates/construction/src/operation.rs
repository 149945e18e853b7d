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

//! The operator representations a finished matrix can be wrapped in, each fixing a different
//! parameter space over the same underlying superoperator:
//!
//! * [FullOp] — every entry free; real parameters over a real basis, re/im pairs otherwise.
//! * [StaticOp] — frozen; no parameters at all.
//! * [TpOp] — trace preserving: the first row is pinned to `[1, 0, ..., 0]` and survives any
//!   parameter assignment; only defined over real bases.
//! * [LinearOp] — the base matrix is an arena and each parameter is a view over a recorded list
//!   of its cells; parameters are additive deviations from zero, cells no parameter references
//!   stay at their base values, and optional pre/post transforms carry the block between its
//!   construction basis and the ambient one.
//!
//! Composition multiplies represented matrices in the listed order and always re-wraps as
//! [FullOp]; whatever constraint either factor carried is deliberately not preserved, and a
//! caller wanting a constrained composite re-applies the constraint afterwards.

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

use crate::error::{ConstructionError, Result};
use crate::superop::{c64, to_complex, to_real_checked, IMAG_TOL};

/// A parameterized linear operator on the vectorized density-matrix space.
#[derive(Clone, Debug)]
pub enum LinearOperator {
    Full(FullOp),
    Static(StaticOp),
    Tp(TpOp),
    Linear(LinearOp),
}

impl LinearOperator {
    /// Side length of the represented superoperator matrix.
    pub fn dim(&self) -> usize {
        match self {
            LinearOperator::Full(op) => op.matrix.nrows(),
            LinearOperator::Static(op) => op.matrix.nrows(),
            LinearOperator::Tp(op) => op.matrix.nrows(),
            LinearOperator::Linear(op) => op.base.nrows(),
        }
    }

    pub fn num_params(&self) -> usize {
        match self {
            LinearOperator::Full(op) => op.num_params(),
            LinearOperator::Static(_) => 0,
            LinearOperator::Tp(op) => op.num_params(),
            LinearOperator::Linear(op) => op.params.len(),
        }
    }

    /// Whether the represented matrix is real-valued (and parameters are plain reals).
    pub fn is_real(&self) -> bool {
        match self {
            LinearOperator::Full(op) => op.real,
            LinearOperator::Static(op) => op.real,
            LinearOperator::Tp(_) => true,
            LinearOperator::Linear(op) => op.real,
        }
    }

    /// The represented superoperator matrix.
    pub fn matrix(&self) -> Array2<Complex64> {
        match self {
            LinearOperator::Full(op) => op.matrix.clone(),
            LinearOperator::Static(op) => op.matrix.clone(),
            LinearOperator::Tp(op) => to_complex(op.matrix.view()),
            LinearOperator::Linear(op) => op.compute_matrix(),
        }
    }

    /// The represented matrix as a real array; fails when the operator lives over a complex
    /// basis.
    pub fn real_matrix(&self) -> Result<Array2<f64>> {
        to_real_checked(self.matrix().view(), IMAG_TOL)
    }

    pub fn to_vector(&self) -> Array1<f64> {
        match self {
            LinearOperator::Full(op) => op.to_vector(),
            LinearOperator::Static(_) => Array1::zeros(0),
            LinearOperator::Tp(op) => op.to_vector(),
            LinearOperator::Linear(op) => op.params.clone(),
        }
    }

    pub fn from_vector(&mut self, params: ArrayView1<f64>) -> Result<()> {
        let expected = self.num_params();
        if params.len() != expected {
            return Err(ConstructionError::ParamCount {
                expected,
                found: params.len(),
            });
        }
        match self {
            LinearOperator::Full(op) => op.from_vector(params),
            LinearOperator::Static(_) => {}
            LinearOperator::Tp(op) => op.from_vector(params),
            LinearOperator::Linear(op) => op.params.assign(&params),
        }
        Ok(())
    }
}

/// Compose two already-embedded operators: the matrix product in the listed order (`first`'s
/// matrix is the left factor), re-wrapped fully parameterized.
pub fn compose(first: &LinearOperator, second: &LinearOperator) -> Result<LinearOperator> {
    if first.dim() != second.dim() {
        return Err(ConstructionError::MatrixDimension {
            expected: first.dim(),
            found: second.dim(),
            context: "to compose operators",
        });
    }
    let product = first.matrix().dot(&second.matrix());
    Ok(LinearOperator::Full(FullOp::new(
        product,
        first.is_real() && second.is_real(),
    )?))
}

/// Every entry a free parameter.
#[derive(Clone, Debug)]
pub struct FullOp {
    matrix: Array2<Complex64>,
    real: bool,
}

impl FullOp {
    /// Wrap a matrix.  When `real` is set the imaginary parts must be numerical noise; they are
    /// checked and scrubbed so later real casts are exact.
    pub fn new(matrix: Array2<Complex64>, real: bool) -> Result<Self> {
        let matrix = if real {
            to_complex(to_real_checked(matrix.view(), IMAG_TOL)?.view())
        } else {
            matrix
        };
        Ok(Self { matrix, real })
    }

    pub fn from_real(matrix: Array2<f64>) -> Self {
        Self {
            matrix: to_complex(matrix.view()),
            real: true,
        }
    }

    fn num_params(&self) -> usize {
        let n = self.matrix.len();
        if self.real {
            n
        } else {
            2 * n
        }
    }

    fn to_vector(&self) -> Array1<f64> {
        if self.real {
            Array1::from_iter(self.matrix.iter().map(|x| x.re))
        } else {
            Array1::from_iter(self.matrix.iter().flat_map(|x| [x.re, x.im]))
        }
    }

    fn from_vector(&mut self, params: ArrayView1<f64>) {
        if self.real {
            for (entry, &value) in self.matrix.iter_mut().zip(params.iter()) {
                *entry = c64(value, 0.0);
            }
        } else {
            for (i, entry) in self.matrix.iter_mut().enumerate() {
                *entry = c64(params[2 * i], params[2 * i + 1]);
            }
        }
    }
}

/// A frozen operator.
#[derive(Clone, Debug)]
pub struct StaticOp {
    matrix: Array2<Complex64>,
    real: bool,
}

impl StaticOp {
    pub fn new(matrix: Array2<Complex64>, real: bool) -> Result<Self> {
        let matrix = if real {
            to_complex(to_real_checked(matrix.view(), IMAG_TOL)?.view())
        } else {
            matrix
        };
        Ok(Self { matrix, real })
    }
}

/// A trace-preserving operator: first row pinned to `[1, 0, ..., 0]`.
#[derive(Clone, Debug)]
pub struct TpOp {
    matrix: Array2<f64>,
}

impl TpOp {
    /// Wrap a real matrix, verifying the trace-preservation row and then pinning it exactly.
    pub fn new(matrix: Array2<f64>) -> Result<Self> {
        let mut matrix = matrix;
        let dim = matrix.nrows();
        for col in 0..dim {
            let expected = if col == 0 { 1.0 } else { 0.0 };
            if (matrix[[0, col]] - expected).abs() > IMAG_TOL {
                return Err(ConstructionError::TpFirstRow);
            }
            matrix[[0, col]] = expected;
        }
        Ok(Self { matrix })
    }

    fn num_params(&self) -> usize {
        let dim = self.matrix.nrows();
        (dim - 1) * dim
    }

    fn to_vector(&self) -> Array1<f64> {
        Array1::from_iter(self.matrix.rows().into_iter().skip(1).flat_map(|row| {
            row.to_vec()
        }))
    }

    fn from_vector(&mut self, params: ArrayView1<f64>) {
        let dim = self.matrix.nrows();
        for row in 1..dim {
            for col in 0..dim {
                self.matrix[[row, col]] = params[(row - 1) * dim + col];
            }
        }
    }
}

/// A linearly parameterized operator over an explicit parameter-to-cells association list.
#[derive(Clone, Debug)]
pub struct LinearOp {
    base: Array2<f64>,
    params: Array1<f64>,
    /// `map[k]` lists the base-matrix cells parameter `k` deviates.
    map: Vec<Vec<(usize, usize)>>,
    pre: Option<Array2<Complex64>>,
    post: Option<Array2<Complex64>>,
    real: bool,
}

impl LinearOp {
    /// Build with all parameters at zero, so the represented matrix starts at
    /// `pre · base · post`.
    pub fn new(
        base: Array2<f64>,
        map: Vec<Vec<(usize, usize)>>,
        pre: Option<Array2<Complex64>>,
        post: Option<Array2<Complex64>>,
        real: bool,
    ) -> Result<Self> {
        let dim = base.nrows();
        for cells in &map {
            for &(row, col) in cells {
                if row >= dim || col >= dim {
                    return Err(ConstructionError::ParamCoordinate { row, col, dim });
                }
            }
        }
        let params = Array1::zeros(map.len());
        Ok(Self {
            base,
            params,
            map,
            pre,
            post,
            real,
        })
    }

    fn compute_matrix(&self) -> Array2<Complex64> {
        let mut deviated = self.base.clone();
        for (value, cells) in self.params.iter().zip(self.map.iter()) {
            for &(row, col) in cells {
                deviated[[row, col]] += *value;
            }
        }
        let mut matrix = to_complex(deviated.view());
        if let Some(pre) = &self.pre {
            matrix = pre.dot(&matrix);
        }
        if let Some(post) = &self.post {
            matrix = matrix.dot(post);
        }
        if self.real {
            // The transforms cancel any imaginary structure over a real basis; scrub the noise.
            matrix.mapv_inplace(|x| c64(x.re, 0.0));
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn real_full(matrix: Array2<f64>) -> LinearOperator {
        LinearOperator::Full(FullOp::from_real(matrix))
    }

    #[test]
    fn full_round_trips_parameters() {
        let mut op = real_full(array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(op.num_params(), 4);
        let vector = op.to_vector();
        assert_eq!(vector, Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]));
        op.from_vector(Array1::from_vec(vec![0.0, 1.0, -1.0, 0.5]).view())
            .unwrap();
        assert_eq!(op.real_matrix().unwrap(), array![[0.0, 1.0], [-1.0, 0.5]]);
    }

    #[test]
    fn complex_full_uses_re_im_pairs() {
        let matrix = array![
            [c64(1.0, 0.5), c64(0.0, 0.0)],
            [c64(0.0, 0.0), c64(0.0, -1.0)]
        ];
        let op = LinearOperator::Full(FullOp::new(matrix, false).unwrap());
        assert_eq!(op.num_params(), 8);
        let vector = op.to_vector();
        assert_eq!(vector[0], 1.0);
        assert_eq!(vector[1], 0.5);
        assert_eq!(vector[7], -1.0);
    }

    #[test]
    fn static_has_no_parameters() {
        let mut op = LinearOperator::Static(
            StaticOp::new(to_complex(array![[1.0, 0.0], [0.0, 1.0]].view()), true).unwrap(),
        );
        assert_eq!(op.num_params(), 0);
        assert!(op.from_vector(Array1::zeros(0).view()).is_ok());
        assert!(op.from_vector(Array1::zeros(1).view()).is_err());
    }

    #[test]
    fn tp_first_row_survives_any_parameters() {
        let base = array![
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0]
        ];
        let mut op = LinearOperator::Tp(TpOp::new(base).unwrap());
        assert_eq!(op.num_params(), 12);
        let params = Array1::from_iter((0..12).map(|i| i as f64 * 0.1 - 0.4));
        op.from_vector(params.view()).unwrap();
        let matrix = op.real_matrix().unwrap();
        assert_eq!(matrix[[0, 0]], 1.0);
        for col in 1..4 {
            assert_eq!(matrix[[0, col]], 0.0);
        }
        assert_eq!(matrix[[1, 0]], 0.0);
        assert_eq!(matrix[[3, 3]], 0.7);
    }

    #[test]
    fn tp_rejects_a_bad_first_row() {
        let base = array![[0.9, 0.0], [0.0, 1.0]];
        assert!(matches!(
            TpOp::new(base),
            Err(ConstructionError::TpFirstRow)
        ));
    }

    #[test]
    fn linear_parameters_deviate_only_their_cells() {
        let base = Array2::eye(4);
        let map = vec![vec![(1, 1)], vec![(2, 2), (3, 3)]];
        let mut op =
            LinearOperator::Linear(LinearOp::new(base.clone(), map, None, None, true).unwrap());
        assert_eq!(op.num_params(), 2);
        // All parameters zero reproduces the base exactly.
        assert_eq!(op.real_matrix().unwrap(), base);
        op.from_vector(Array1::from_vec(vec![0.25, -0.5]).view())
            .unwrap();
        let matrix = op.real_matrix().unwrap();
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[1, 1]], 1.25);
        assert_eq!(matrix[[2, 2]], 0.5);
        assert_eq!(matrix[[3, 3]], 0.5);
        assert_eq!(matrix[[2, 3]], 0.0);
    }

    #[test]
    fn linear_rejects_out_of_range_cells() {
        assert!(matches!(
            LinearOp::new(Array2::eye(2), vec![vec![(2, 0)]], None, None, true),
            Err(ConstructionError::ParamCoordinate { .. })
        ));
    }

    #[test]
    fn compose_multiplies_in_listed_order_and_degrades_to_full() {
        let a = real_full(array![[1.0, 1.0], [0.0, 1.0]]);
        let b = real_full(array![[1.0, 0.0], [2.0, 1.0]]);
        let ab = compose(&a, &b).unwrap();
        assert!(matches!(ab, LinearOperator::Full(_)));
        assert_eq!(ab.real_matrix().unwrap(), array![[3.0, 1.0], [2.0, 1.0]]);
        let ba = compose(&b, &a).unwrap();
        assert_eq!(ba.real_matrix().unwrap(), array![[1.0, 1.0], [2.0, 3.0]]);
    }
}
