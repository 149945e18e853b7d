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

//! The model-construction engine: compile symbolic gate expressions such as
//! `"X(pi/2,Q0):CNOT(Q0,Q1)"` into parameterized linear operators on a structured,
//! block-decomposed density-matrix space, and assemble complete explicit models out of them.
//!
//! The data flow mirrors the module layout, leaf first:
//!
//! 1. [statespace] resolves user-chosen subsystem labels into tensor-product blocks and
//!    dimensions;
//! 2. [basis] describes the numerical bases of the vectorized density-matrix space and the
//!    transforms and resizes between them;
//! 3. the expression crate parses the symbolic gate string into terms;
//! 4. [primitives] turns each term into a dense local unitary or process matrix;
//! 5. [embed] lifts the local matrix into the full composite space, tracking which global
//!    entries each parameter controls;
//! 6. [operation] wraps the finished matrix in one of the parameterization schemes;
//! 7. [builder] composes terms, builds state-preparation and effect vectors, and assembles the
//!    [model::ExplicitModel] with its default gauge group.
//!
//! Everything is synchronous, CPU-bound dense linear algebra over immutable inputs; the only
//! mutation anywhere is the assembler filling in a freshly created model.

pub mod basis;
pub mod builder;
pub mod embed;
pub mod error;
pub mod gauge;
pub mod model;
pub mod operation;
pub mod primitives;
pub mod statespace;
pub mod superop;

pub use basis::{change_basis, change_basis_vec, resize_mx, Basis, ResizeMode};
pub use builder::{
    build_explicit_model, build_identity_vector, build_operation, build_vector, EffectSpec,
    ExplicitModelSpec, PovmSpec,
};
pub use embed::{embed_process, embed_unitary, EmbedContext, ParamSelection, Parameterization};
pub use error::{ConstructionError, Result};
pub use gauge::GaugeGroup;
pub use model::{ExplicitModel, Povm, PovmKind};
pub use operation::{compose, LinearOperator};
pub use primitives::Primitive;
pub use statespace::StateSpaceLabels;
