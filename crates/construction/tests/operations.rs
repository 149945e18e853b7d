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

//! End-to-end properties of expression-built operations.

use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;

use gateset_construction::{
    build_identity_vector, build_operation, build_vector, Basis, ConstructionError,
    LinearOperator, Parameterization, StateSpaceLabels,
};
use gateset_expr::GrammarError;

fn single_qubit() -> StateSpaceLabels {
    StateSpaceLabels::new(&[&["Q0"]]).unwrap()
}

fn qubit_pair() -> StateSpaceLabels {
    StateSpaceLabels::new(&[&["Q0", "Q1"]]).unwrap()
}

fn assert_matrices_close(a: ArrayView2<f64>, b: ArrayView2<f64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < tol, "matrices differ: {x} vs {y}");
    }
}

#[test]
fn identity_on_both_qubits_is_the_identity_superoperator() {
    let labels = qubit_pair();
    let basis = Basis::new("pp", labels.block_dims()).unwrap();
    let op = build_operation(&labels, "I(Q0):I(Q1)", &basis, Parameterization::Full, false)
        .unwrap();
    assert_matrices_close(
        op.real_matrix().unwrap().view(),
        Array2::eye(16).view(),
        1e-12,
    );
}

#[test]
fn x_pi_is_the_pauli_x_conjugation_channel_under_both_strategies() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    // Conjugation by X fixes I and X and negates Y and Z.
    let expected = Array2::from_diag(&ndarray::arr1(&[1.0, 1.0, -1.0, -1.0]));
    for unitary_embedding in [false, true] {
        let op = build_operation(
            &labels,
            "X(pi,Q0)",
            &basis,
            Parameterization::Full,
            unitary_embedding,
        )
        .unwrap();
        assert_matrices_close(op.real_matrix().unwrap().view(), expected.view(), 1e-12);
    }
}

#[test]
fn gm_and_pp_agree_for_a_single_qubit() {
    let labels = single_qubit();
    let pp = Basis::single("pp", 2).unwrap();
    let gm = Basis::single("gm", 2).unwrap();
    let from_pp = build_operation(&labels, "Y(pi/2,Q0)", &pp, Parameterization::Full, false)
        .unwrap();
    let from_gm = build_operation(&labels, "Y(pi/2,Q0)", &gm, Parameterization::Full, false)
        .unwrap();
    // The single-qubit Gell-Mann and Pauli bases coincide element for element.
    assert_matrices_close(
        from_pp.real_matrix().unwrap().view(),
        from_gm.real_matrix().unwrap().view(),
        1e-12,
    );
}

#[test]
fn cnot_fixes_00_and_maps_10_to_11() {
    let labels = qubit_pair();
    let basis = Basis::new("std", labels.block_dims()).unwrap();
    let op = build_operation(&labels, "CNOT(Q0,Q1)", &basis, Parameterization::Full, false)
        .unwrap();
    let matrix = op.matrix();
    assert_eq!(matrix.nrows(), 16);

    // Applying the superoperator to a vectorized basis state reads off a column.  |00><00| is
    // dense index 0 and is fixed; |10><10| is index 2*4 + 2 = 10 and maps to |11><11| at 15.
    for row in 0..16 {
        let expected = if row == 0 { 1.0 } else { 0.0 };
        assert!((matrix[[row, 0]] - Complex64::new(expected, 0.0)).norm() < 1e-12);
    }
    for row in 0..16 {
        let expected = if row == 15 { 1.0 } else { 0.0 };
        assert!((matrix[[row, 10]] - Complex64::new(expected, 0.0)).norm() < 1e-12);
    }
}

#[test]
fn two_quarter_turns_equal_a_half_turn() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let composed = build_operation(
        &labels,
        "X(pi/2,Q0):X(pi/2,Q0)",
        &basis,
        Parameterization::Full,
        false,
    )
    .unwrap();
    let direct = build_operation(&labels, "X(pi,Q0)", &basis, Parameterization::Full, false)
        .unwrap();
    assert_matrices_close(
        composed.real_matrix().unwrap().view(),
        direct.real_matrix().unwrap().view(),
        1e-10,
    );
    // Composition degrades to the fully parameterized form.
    assert!(matches!(composed, LinearOperator::Full(_)));
}

#[test]
fn linear_parameterization_counts_and_zero_point() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let mut linear = build_operation(
        &labels,
        "X(pi/2,Q0)",
        &basis,
        Parameterization::Linear,
        false,
    )
    .unwrap();
    // Every local entry of the one-qubit process matrix is a parameter.
    assert_eq!(linear.num_params(), 16);

    let full = build_operation(&labels, "X(pi/2,Q0)", &basis, Parameterization::Full, false)
        .unwrap();
    // All parameters at zero reproduce the base matrix exactly.
    assert_matrices_close(
        linear.real_matrix().unwrap().view(),
        full.real_matrix().unwrap().view(),
        1e-12,
    );

    // A deviation moves exactly the cells of its parameter.
    let mut params = Array1::zeros(16);
    params[5] = 0.25; // local cell (1, 1), the X->X entry
    linear.from_vector(params.view()).unwrap();
    let deviated = linear.real_matrix().unwrap();
    let base = full.real_matrix().unwrap();
    assert!((deviated[[1, 1]] - (base[[1, 1]] + 0.25)).abs() < 1e-12);
    assert!((deviated[[2, 2]] - base[[2, 2]]).abs() < 1e-12);
}

#[test]
fn linear_tp_excludes_the_first_row() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let op = build_operation(
        &labels,
        "X(pi/2,Q0)",
        &basis,
        Parameterization::LinearTp,
        false,
    )
    .unwrap();
    assert_eq!(op.num_params(), 12);
}

#[test]
fn tp_first_row_survives_parameter_assignment() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let mut op = build_operation(&labels, "X(pi/2,Q0)", &basis, Parameterization::Tp, false)
        .unwrap();
    assert_eq!(op.num_params(), 12);
    let params = Array1::from_iter((0..12).map(|i| (i as f64) * 0.05 - 0.3));
    op.from_vector(params.view()).unwrap();
    let matrix = op.real_matrix().unwrap();
    assert_eq!(matrix[[0, 0]], 1.0);
    for col in 1..4 {
        assert_eq!(matrix[[0, col]], 0.0);
    }
}

#[test]
fn tp_requires_a_real_basis() {
    let labels = single_qubit();
    let basis = Basis::single("std", 2).unwrap();
    assert!(matches!(
        build_operation(&labels, "X(pi/2,Q0)", &basis, Parameterization::Tp, false),
        Err(ConstructionError::TpRequiresRealBasis(_))
    ));
}

#[test]
fn unitary_embedding_rejects_non_full_parameterizations() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    assert!(matches!(
        build_operation(&labels, "X(pi/2,Q0)", &basis, Parameterization::Tp, true),
        Err(ConstructionError::UnitaryEmbeddingNotFull(_))
    ));
}

#[test]
fn diagonal_gate_parameterizes_only_the_diagonal() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let linear = build_operation(&labels, "D(Q0)", &basis, Parameterization::Linear, false)
        .unwrap();
    assert_eq!(linear.num_params(), 4);
    let linear_tp =
        build_operation(&labels, "D(Q0)", &basis, Parameterization::LinearTp, false).unwrap();
    assert_eq!(linear_tp.num_params(), 3);

    assert!(matches!(
        build_operation(&labels, "D(Q0)", &basis, Parameterization::Full, false),
        Err(ConstructionError::DiagonalGateNotLinear)
    ));
}

#[test]
fn general_rotation_accepts_sqrt_but_axis_rotations_do_not() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    let op = build_operation(
        &labels,
        "N(pi/2,1/sqrt(2),0,1/sqrt(2),Q0)",
        &basis,
        Parameterization::Full,
        false,
    )
    .unwrap();
    // A rotation channel is orthogonal in the pp basis: columns have unit norm.
    let matrix = op.real_matrix().unwrap();
    for col in 0..4 {
        let norm: f64 = (0..4).map(|row| matrix[[row, col]].powi(2)).sum();
        assert!((norm - 1.0).abs() < 1e-10);
    }

    assert!(matches!(
        build_operation(
            &labels,
            "X(sqrt(2),Q0)",
            &basis,
            Parameterization::Full,
            false
        ),
        Err(ConstructionError::Grammar(GrammarError::SqrtForbidden))
    ));
}

#[test]
fn grammar_errors_surface_through_build() {
    let labels = single_qubit();
    let basis = Basis::single("pp", 2).unwrap();
    assert!(matches!(
        build_operation(&labels, "FOO(pi,Q0)", &basis, Parameterization::Full, false),
        Err(ConstructionError::Grammar(GrammarError::InvalidGateName(_)))
    ));
    assert!(matches!(
        build_operation(&labels, "X(pi)", &basis, Parameterization::Full, false),
        Err(ConstructionError::Grammar(
            GrammarError::WrongArgumentCount {
                expected: 2,
                found: 1,
                ..
            }
        ))
    ));
    assert!(matches!(
        build_operation(&labels, "X(pi,", &basis, Parameterization::Full, false),
        Err(ConstructionError::Grammar(GrammarError::UnexpectedEof { .. }))
    ));
}

#[test]
fn gates_spanning_blocks_are_dimension_errors() {
    let labels = StateSpaceLabels::new(&[&["Q0"], &["Q1"]]).unwrap();
    let basis = Basis::new("gm", labels.block_dims()).unwrap();
    assert!(matches!(
        build_operation(
            &labels,
            "CNOT(Q0,Q1)",
            &basis,
            Parameterization::Full,
            false
        ),
        Err(ConstructionError::MultiBlockGate { .. })
    ));
}

#[test]
fn rotations_must_act_on_qubits() {
    let labels = StateSpaceLabels::new(&[&["Q0"], &["L0"]]).unwrap();
    let basis = Basis::new("gm", labels.block_dims()).unwrap();
    assert!(matches!(
        build_operation(&labels, "X(pi,L0)", &basis, Parameterization::Full, false),
        Err(ConstructionError::NotATwoLevelSystem { .. })
    ));
}

#[test]
fn leakage_rotation_swaps_populations_and_destroys_cross_block_coherence() {
    // A qubit block plus a leakage level: reduced space is 5 dimensional, with the within-qubit
    // matrix units at 0..4 and the leakage population at 4.
    let labels = StateSpaceLabels::new(&[&["Q0"], &["L0"]]).unwrap();
    let basis = Basis::new("std", labels.block_dims()).unwrap();
    let op = build_operation(&labels, "LX(pi,0,2)", &basis, Parameterization::Full, false)
        .unwrap();
    let matrix = op.matrix();
    assert_eq!(matrix.nrows(), 5);

    let column = |col: usize| -> Vec<Complex64> { (0..5).map(|row| matrix[[row, col]]).collect() };
    let unit = |index: usize| -> Vec<Complex64> {
        (0..5)
            .map(|row| Complex64::new(if row == index { 1.0 } else { 0.0 }, 0.0))
            .collect()
    };
    let zeros: Vec<Complex64> = vec![Complex64::new(0.0, 0.0); 5];
    let close = |a: &[Complex64], b: &[Complex64]| {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() < 1e-10)
    };

    // Populations swap between state 0 and the leakage state...
    assert!(close(&column(0), &unit(4)));
    assert!(close(&column(4), &unit(0)));
    // ...the untouched population stays...
    assert!(close(&column(3), &unit(3)));
    // ...and the qubit's internal coherences are destroyed, not rotated.
    assert!(close(&column(1), &zeros));
    assert!(close(&column(2), &zeros));
}

#[test]
fn prep_vectors_in_the_pauli_basis() {
    let basis = Basis::single("pp", 2).unwrap();
    let rho0 = build_vector("0", &basis).unwrap();
    let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    let expected = [inv_sqrt2, 0.0, 0.0, inv_sqrt2];
    for (value, expected) in rho0.iter().zip(expected) {
        assert!((value - Complex64::new(expected, 0.0)).norm() < 1e-12);
    }

    let identity = build_identity_vector(&basis).unwrap();
    assert!((identity[0] - Complex64::new(std::f64::consts::SQRT_2, 0.0)).norm() < 1e-12);
    for value in identity.iter().skip(1) {
        assert!(value.norm() < 1e-12);
    }
}

#[test]
fn vector_expressions_must_be_state_indices() {
    let basis = Basis::single("pp", 2).unwrap();
    assert!(matches!(
        build_vector("zero", &basis),
        Err(ConstructionError::BadVectorExpression(_))
    ));
    assert!(matches!(
        build_vector("5", &basis),
        Err(ConstructionError::StateIndexOutOfRange { index: 5, dim: 2 })
    ));
}
