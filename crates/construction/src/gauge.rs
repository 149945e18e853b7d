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

//! Default gauge (symmetry) groups.  A gauge transformation is a similarity change of the whole
//! model that leaves every predicted probability invariant; how much of that freedom a model is
//! assumed to have tracks its parameterization: fully parameterized models get the full group,
//! trace-preserving models get the subgroup fixing the first superoperator row, and anything
//! more constrained is assumed to have none at all.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{ConstructionError, Result};

/// A family of invertible gauge transformations, generated from a real parameter vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GaugeGroup {
    /// Every entry of the transformation matrix is free.
    Full { dim: usize },
    /// The first row is pinned to `[1, 0, ..., 0]`, preserving trace constraints.
    TracePreserving { dim: usize },
}

impl GaugeGroup {
    pub fn dim(&self) -> usize {
        match self {
            GaugeGroup::Full { dim } | GaugeGroup::TracePreserving { dim } => *dim,
        }
    }

    pub fn num_params(&self) -> usize {
        match self {
            GaugeGroup::Full { dim } => dim * dim,
            GaugeGroup::TracePreserving { dim } => (dim - 1) * dim,
        }
    }

    /// The parameter vector whose element is the identity transformation.
    pub fn identity_vector(&self) -> Array1<f64> {
        let dim = self.dim();
        let mut vector = Array1::zeros(self.num_params());
        match self {
            GaugeGroup::Full { .. } => {
                for i in 0..dim {
                    vector[i * dim + i] = 1.0;
                }
            }
            GaugeGroup::TracePreserving { .. } => {
                for i in 1..dim {
                    vector[(i - 1) * dim + i] = 1.0;
                }
            }
        }
        vector
    }

    /// The transformation matrix of a group element.
    pub fn element(&self, params: ArrayView1<f64>) -> Result<Array2<f64>> {
        if params.len() != self.num_params() {
            return Err(ConstructionError::ParamCount {
                expected: self.num_params(),
                found: params.len(),
            });
        }
        let dim = self.dim();
        let mut matrix = Array2::zeros((dim, dim));
        match self {
            GaugeGroup::Full { .. } => {
                for row in 0..dim {
                    for col in 0..dim {
                        matrix[[row, col]] = params[row * dim + col];
                    }
                }
            }
            GaugeGroup::TracePreserving { .. } => {
                matrix[[0, 0]] = 1.0;
                for row in 1..dim {
                    for col in 0..dim {
                        matrix[[row, col]] = params[(row - 1) * dim + col];
                    }
                }
            }
        }
        Ok(matrix)
    }
}
