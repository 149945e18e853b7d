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

//! The explicit model: labelled state preparations, POVMs and operations over one basis, with an
//! optional default gauge group.  Built once by the assembler; afterwards it only changes through
//! explicit edits, and derived models (alias composition) are new values rather than mutations of
//! their source.

use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::basis::Basis;
use crate::error::{ConstructionError, Result};
use crate::gauge::GaugeGroup;
use crate::operation::{FullOp, LinearOperator};

/// Whether a POVM's final effect is constrained to complete the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PovmKind {
    Unconstrained,
    /// The effects must sum to the identity; the last one is understood as the complement of the
    /// others, matching a trace-preserving model parameterization.
    TraceConstrained,
}

/// A labelled collection of effect vectors.
#[derive(Clone, Debug)]
pub struct Povm {
    kind: PovmKind,
    effects: IndexMap<String, Array1<Complex64>>,
}

impl Povm {
    pub fn new(kind: PovmKind, effects: IndexMap<String, Array1<Complex64>>) -> Self {
        Self { kind, effects }
    }

    pub fn kind(&self) -> PovmKind {
        self.kind
    }

    pub fn effects(&self) -> &IndexMap<String, Array1<Complex64>> {
        &self.effects
    }
}

/// A complete explicit model.
#[derive(Clone, Debug)]
pub struct ExplicitModel {
    preps: IndexMap<String, Array1<Complex64>>,
    povms: IndexMap<String, Povm>,
    operations: IndexMap<String, LinearOperator>,
    basis: Basis,
    default_gauge_group: Option<GaugeGroup>,
}

impl ExplicitModel {
    pub fn new(basis: Basis) -> Self {
        Self {
            preps: IndexMap::new(),
            povms: IndexMap::new(),
            operations: IndexMap::new(),
            basis,
            default_gauge_group: None,
        }
    }

    /// Superoperator dimension of the model's space.
    pub fn dim(&self) -> usize {
        self.basis.superop_dim()
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn preps(&self) -> &IndexMap<String, Array1<Complex64>> {
        &self.preps
    }

    pub fn povms(&self) -> &IndexMap<String, Povm> {
        &self.povms
    }

    pub fn operations(&self) -> &IndexMap<String, LinearOperator> {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut IndexMap<String, LinearOperator> {
        &mut self.operations
    }

    pub fn default_gauge_group(&self) -> Option<&GaugeGroup> {
        self.default_gauge_group.as_ref()
    }

    pub fn set_default_gauge_group(&mut self, group: Option<GaugeGroup>) {
        self.default_gauge_group = group;
    }

    pub fn insert_prep(&mut self, label: impl Into<String>, vec: Array1<Complex64>) {
        self.preps.insert(label.into(), vec);
    }

    pub fn insert_povm(&mut self, label: impl Into<String>, povm: Povm) {
        self.povms.insert(label.into(), povm);
    }

    pub fn insert_operation(&mut self, label: impl Into<String>, op: LinearOperator) {
        self.operations.insert(label.into(), op);
    }

    pub fn operation(&self, label: &str) -> Result<&LinearOperator> {
        self.operations
            .get(label)
            .ok_or_else(|| ConstructionError::MissingOperation(label.to_owned()))
    }

    /// The matrix of a sequence of named operations, multiplied in the listed order (the first
    /// label's matrix is the left factor, matching expression-term composition).
    pub fn product(&self, sequence: &[&str]) -> Result<Array2<Complex64>> {
        let mut acc: Array2<Complex64> = Array2::eye(self.dim());
        for &label in sequence {
            acc = acc.dot(&self.operation(label)?.matrix());
        }
        Ok(acc)
    }

    /// Derive a new model whose operations are compositions of this model's primitives, per the
    /// alias table.  SPAM and the basis are copied unchanged; composed operations come out fully
    /// parameterized; this model is not touched.
    pub fn alias_model(&self, aliases: &[(&str, &[&str])]) -> Result<ExplicitModel> {
        let mut derived = self.clone();
        derived.operations.clear();
        for (label, sequence) in aliases {
            let matrix = self.product(sequence)?;
            let real = sequence
                .iter()
                .map(|gate| self.operation(gate))
                .collect::<Result<Vec<_>>>()?
                .iter()
                .all(|op| op.is_real());
            derived
                .operations
                .insert((*label).to_owned(), LinearOperator::Full(FullOp::new(matrix, real)?));
        }
        Ok(derived)
    }
}
