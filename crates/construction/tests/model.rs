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

//! Assembly of complete explicit models.

use num_complex::Complex64;

use gateset_construction::{
    build_explicit_model, build_operation, Basis, ConstructionError, ExplicitModelSpec,
    GaugeGroup, LinearOperator, Parameterization, PovmKind, StateSpaceLabels,
};

fn single_qubit_spec(parameterization: Parameterization) -> ExplicitModelSpec {
    let labels = StateSpaceLabels::new(&[&["Q0"]]).unwrap();
    let basis = Basis::single("pp", 2).unwrap();
    ExplicitModelSpec::new(
        labels,
        basis,
        &[
            ("Gi", "I(Q0)"),
            ("Gx", "X(pi/2,Q0)"),
            ("Gy", "Y(pi/2,Q0)"),
        ],
    )
    .with_parameterization(parameterization)
}

#[test]
fn full_model_has_the_standard_pieces() {
    let model = build_explicit_model(&single_qubit_spec(Parameterization::Full)).unwrap();
    assert_eq!(model.dim(), 4);
    assert_eq!(model.preps().len(), 1);
    assert!(model.preps().contains_key("rho0"));

    let povm = &model.povms()["Mdefault"];
    assert_eq!(povm.kind(), PovmKind::Unconstrained);
    let effect_labels: Vec<&String> = povm.effects().keys().collect();
    assert_eq!(effect_labels, ["0", "1"]);
    // The "1" effect is the vectorization of |1><1| in the Pauli basis.
    let effect1 = &povm.effects()["1"];
    let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    for (value, expected) in effect1.iter().zip([inv_sqrt2, 0.0, 0.0, -inv_sqrt2]) {
        assert!((value - Complex64::new(expected, 0.0)).norm() < 1e-12);
    }

    assert_eq!(model.operations().len(), 3);
    assert!(matches!(
        model.operations()["Gx"],
        LinearOperator::Full(_)
    ));
    assert_eq!(
        model.default_gauge_group(),
        Some(&GaugeGroup::Full { dim: 4 })
    );
}

#[test]
fn tp_model_constrains_everything_it_should() {
    let model = build_explicit_model(&single_qubit_spec(Parameterization::Tp)).unwrap();
    assert_eq!(model.povms()["Mdefault"].kind(), PovmKind::TraceConstrained);
    assert_eq!(
        model.default_gauge_group(),
        Some(&GaugeGroup::TracePreserving { dim: 4 })
    );
    for (_, op) in model.operations() {
        assert!(matches!(op, LinearOperator::Tp(_)));
        let matrix = op.real_matrix().unwrap();
        assert_eq!(matrix[[0, 0]], 1.0);
        for col in 1..4 {
            assert_eq!(matrix[[0, col]], 0.0);
        }
    }
}

#[test]
fn constrained_parameterizations_get_no_gauge_group() {
    for parameterization in [
        Parameterization::Static,
        Parameterization::Linear,
        Parameterization::LinearTp,
    ] {
        let model = build_explicit_model(&single_qubit_spec(parameterization)).unwrap();
        assert_eq!(model.default_gauge_group(), None);
    }
}

#[test]
fn basis_and_labels_must_agree() {
    let labels = StateSpaceLabels::new(&[&["Q0", "Q1"]]).unwrap();
    let basis = Basis::single("pp", 2).unwrap();
    let spec = ExplicitModelSpec::new(labels, basis, &[("Gi", "I(Q0)")]);
    assert!(matches!(
        build_explicit_model(&spec),
        Err(ConstructionError::StateSpaceMismatch { .. })
    ));
}

#[test]
fn alias_models_compose_primitives_without_touching_the_source() {
    let model = build_explicit_model(&single_qubit_spec(Parameterization::Full)).unwrap();
    let derived = model.alias_model(&[("Gxx", &["Gx", "Gx"])]).unwrap();

    // The composed alias equals the directly built half turn.
    let labels = StateSpaceLabels::new(&[&["Q0"]]).unwrap();
    let basis = Basis::single("pp", 2).unwrap();
    let direct = build_operation(&labels, "X(pi,Q0)", &basis, Parameterization::Full, false)
        .unwrap();
    let alias = derived.operations()["Gxx"].real_matrix().unwrap();
    let expected = direct.real_matrix().unwrap();
    for (x, y) in alias.iter().zip(expected.iter()) {
        assert!((x - y).abs() < 1e-10);
    }

    // SPAM is copied, the primitive set is replaced in the derived model only.
    assert_eq!(derived.preps().len(), 1);
    assert_eq!(derived.operations().len(), 1);
    assert!(model.operations().contains_key("Gx"));
    assert!(!model.operations().contains_key("Gxx"));
}

#[test]
fn products_of_unknown_operations_fail() {
    let model = build_explicit_model(&single_qubit_spec(Parameterization::Full)).unwrap();
    assert!(matches!(
        model.product(&["Gx", "Gz"]),
        Err(ConstructionError::MissingOperation(_))
    ));
}

#[test]
fn auto_basis_matches_the_space() {
    let labels = StateSpaceLabels::new(&[&["Q0", "Q1"]]).unwrap();
    let basis = Basis::auto(labels.block_dims()).unwrap();
    assert_eq!(basis.name(), "pp");
    let spec = ExplicitModelSpec::new(labels, basis, &[("Gcnot", "CNOT(Q0,Q1)")]);
    let model = build_explicit_model(&spec).unwrap();
    assert_eq!(model.dim(), 16);
    assert_eq!(model.povms()["Mdefault"].effects().len(), 4);
}
