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

//! The assembler: state-preparation and effect vectors from index expressions, operations from
//! symbolic gate expressions, and complete explicit models from labelled collections of both.
//!
//! A vector expression is simply the integer index of a pure state within the whole state space;
//! the built vector is the vectorization of that diagonal density-matrix element, expressed in
//! the model basis.  An operation expression is parsed into terms, each term is synthesized and
//! embedded, and the terms are composed by matrix multiplication in the order listed (the first
//! term's matrix is the leftmost factor).

use indexmap::IndexMap;
use ndarray::Array1;
use num_complex::Complex64;

use crate::basis::{change_basis_vec, Basis};
use crate::embed::{EmbedContext, Parameterization};
use crate::error::{ConstructionError, Result};
use crate::gauge::GaugeGroup;
use crate::model::{ExplicitModel, Povm, PovmKind};
use crate::operation::{compose, LinearOperator};
use crate::primitives::synthesize_term;
use crate::statespace::StateSpaceLabels;
use crate::superop::C_ONE;

/// Build the vector for the pure state of the given index (as a string expression), in the
/// target basis.
pub fn build_vector(expr: &str, basis: &Basis) -> Result<Array1<Complex64>> {
    let index: usize = expr
        .trim()
        .parse()
        .map_err(|_| ConstructionError::BadVectorExpression(expr.to_owned()))?;
    let dm_dim = basis.dm_dim();
    if index >= dm_dim {
        return Err(ConstructionError::StateIndexOutOfRange {
            index,
            dim: dm_dim,
        });
    }
    diagonal_vector(basis, |state| state == index)
}

/// Build the vectorized identity density matrix (every diagonal element set) in the target
/// basis.
pub fn build_identity_vector(basis: &Basis) -> Result<Array1<Complex64>> {
    diagonal_vector(basis, |_| true)
}

/// A vector with unit weight at the reduced-standard coordinates of the selected diagonal
/// density-matrix elements, changed into the target basis.
fn diagonal_vector(basis: &Basis, select: impl Fn(usize) -> bool) -> Result<Array1<Complex64>> {
    let mut reduced: Array1<Complex64> = Array1::zeros(basis.superop_dim());
    let mut vec_index = 0;
    let mut start = 0;
    for &dim in basis.block_dims() {
        for i in start..start + dim {
            for j in start..start + dim {
                if i == j && select(i) {
                    reduced[vec_index] = C_ONE;
                }
                vec_index += 1;
            }
        }
        start += dim;
    }
    let std = Basis::new("std", basis.block_dims())?;
    change_basis_vec(reduced.view(), &std, basis)
}

/// Build an operation from a symbolic expression.  `unitary_embedding` selects the embedding
/// strategy; it is only available for the `full` parameterization.
pub fn build_operation(
    labels: &StateSpaceLabels,
    expr: &str,
    basis: &Basis,
    parameterization: Parameterization,
    unitary_embedding: bool,
) -> Result<LinearOperator> {
    let ctx = EmbedContext::new(labels, basis, parameterization)?;
    let parsed = gateset_expr::parse(expr)?;
    let mut terms = parsed.terms.iter();
    // The grammar guarantees at least one term.
    let mut op = synthesize_term(&ctx, terms.next().unwrap(), unitary_embedding)?;
    for term in terms {
        let next = synthesize_term(&ctx, term, unitary_embedding)?;
        op = compose(&op, &next)?;
    }
    Ok(op)
}

/// The effect structure of one POVM in an [ExplicitModelSpec].
#[derive(Clone, Debug)]
pub enum EffectSpec {
    /// Effects `"0"`, `"1"`, ... up to the state-space dimension, each label doubling as its
    /// expression.
    Standard,
    /// Explicit `(label, expression)` pairs.
    Labeled(Vec<(String, String)>),
}

/// One named POVM.
#[derive(Clone, Debug)]
pub struct PovmSpec {
    pub label: String,
    pub effects: EffectSpec,
}

/// Everything needed to assemble an explicit model.  The usual construction is
/// [ExplicitModelSpec::new] plus the `with_` builders for anything beyond the defaults
/// (a single `rho0` prepared in state 0, and a single standard `Mdefault` POVM).
#[derive(Clone, Debug)]
pub struct ExplicitModelSpec {
    pub state_space: StateSpaceLabels,
    pub basis: Basis,
    pub operations: Vec<(String, String)>,
    pub preps: Vec<(String, String)>,
    pub povms: Vec<PovmSpec>,
    pub parameterization: Parameterization,
}

impl ExplicitModelSpec {
    pub fn new(state_space: StateSpaceLabels, basis: Basis, operations: &[(&str, &str)]) -> Self {
        Self {
            state_space,
            basis,
            operations: operations
                .iter()
                .map(|(label, expr)| ((*label).to_owned(), (*expr).to_owned()))
                .collect(),
            preps: vec![("rho0".to_owned(), "0".to_owned())],
            povms: vec![PovmSpec {
                label: "Mdefault".to_owned(),
                effects: EffectSpec::Standard,
            }],
            parameterization: Parameterization::Full,
        }
    }

    pub fn with_parameterization(mut self, parameterization: Parameterization) -> Self {
        self.parameterization = parameterization;
        self
    }

    pub fn with_preps(mut self, preps: &[(&str, &str)]) -> Self {
        self.preps = preps
            .iter()
            .map(|(label, expr)| ((*label).to_owned(), (*expr).to_owned()))
            .collect();
        self
    }

    pub fn with_povms(mut self, povms: Vec<PovmSpec>) -> Self {
        self.povms = povms;
        self
    }
}

/// Assemble a complete explicit model from a spec.
pub fn build_explicit_model(spec: &ExplicitModelSpec) -> Result<ExplicitModel> {
    if spec.state_space.block_dims() != spec.basis.block_dims() {
        return Err(ConstructionError::StateSpaceMismatch {
            labels: spec.state_space.block_dims().to_vec(),
            basis: spec.basis.block_dims().to_vec(),
        });
    }
    let trace_constrained = matches!(
        spec.parameterization,
        Parameterization::Tp | Parameterization::LinearTp
    );
    let mut model = ExplicitModel::new(spec.basis.clone());

    for (label, expr) in &spec.preps {
        model.insert_prep(label.clone(), build_vector(expr, &spec.basis)?);
    }

    for povm_spec in &spec.povms {
        let pairs: Vec<(String, String)> = match &povm_spec.effects {
            EffectSpec::Standard => (0..spec.basis.dm_dim())
                .map(|i| (i.to_string(), i.to_string()))
                .collect(),
            EffectSpec::Labeled(pairs) => pairs.clone(),
        };
        let mut effects = IndexMap::new();
        for (label, expr) in pairs {
            effects.insert(label, build_vector(&expr, &spec.basis)?);
        }
        let kind = if trace_constrained {
            PovmKind::TraceConstrained
        } else {
            PovmKind::Unconstrained
        };
        model.insert_povm(povm_spec.label.clone(), Povm::new(kind, effects));
    }

    for (label, expr) in &spec.operations {
        let op = build_operation(
            &spec.state_space,
            expr,
            &spec.basis,
            spec.parameterization,
            false,
        )?;
        model.insert_operation(label.clone(), op);
    }

    model.set_default_gauge_group(match spec.parameterization {
        Parameterization::Full => Some(GaugeGroup::Full { dim: model.dim() }),
        Parameterization::Tp => Some(GaugeGroup::TracePreserving { dim: model.dim() }),
        _ => None,
    });
    Ok(model)
}
