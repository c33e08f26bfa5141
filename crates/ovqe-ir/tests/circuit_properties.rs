//! Property-based tests for circuit composition, adjoint and parameter extraction.

use ovqe_ir::gate::{cnot, h, phase, rx, ry, rz, s, swap, t, x};
use ovqe_ir::{Circuit, Gate, IrError, ParameterExpression};
use proptest::prelude::*;

/// Generate a parameter: fixed angle or one of a few names.
fn arb_parameter() -> impl Strategy<Value = ParameterExpression> {
    prop_oneof![
        (-6.3_f64..6.3).prop_map(ParameterExpression::constant),
        prop::sample::select(vec!["a", "b", "c"]).prop_map(ParameterExpression::symbol),
    ]
}

/// Generate a gate on up to 6 qubits, parametrized or not, possibly frozen.
fn arb_gate() -> impl Strategy<Value = Gate> {
    let q = 0_u32..6;
    let plain = prop_oneof![
        q.clone().prop_map(h),
        q.clone().prop_map(x),
        q.clone().prop_map(s),
        q.clone().prop_map(t),
        (0_u32..3, 3_u32..6).prop_map(|(c, tq)| cnot(c, tq)),
        (0_u32..3, 3_u32..6).prop_map(|(a, b)| swap(a, b)),
    ];
    let rotation = (0_u8..4, arb_parameter(), q).prop_map(|(kind, p, target)| match kind {
        0 => rx(p, target),
        1 => ry(p, target),
        2 => rz(p, target),
        _ => phase(p, target),
    });
    let rotation = (rotation, any::<bool>())
        .prop_map(|(g, frozen)| if frozen { g.frozen() } else { g });
    prop_oneof![plain, rotation]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (
        prop::collection::vec(arb_gate(), 0..12),
        prop_oneof![Just(1.0), 0.1_f64..3.0],
    )
        .prop_map(|(gates, weight)| Circuit::from_gates(gates).with_weight(weight))
}

proptest! {
    #[test]
    fn dagger_reverses_gate_order(circuit in arb_circuit()) {
        let adjoint = circuit.dagger();
        prop_assert_eq!(adjoint.len(), circuit.len());
        for i in 0..circuit.len() {
            prop_assert_eq!(&adjoint[i], &circuit[circuit.len() - 1 - i].dagger());
        }
    }

    #[test]
    fn dagger_is_an_involution(circuit in arb_circuit()) {
        prop_assert_eq!(circuit.dagger().dagger(), circuit);
    }

    #[test]
    fn concat_preserves_operands(a in arb_circuit(), b in arb_circuit()) {
        let (a_before, b_before) = (a.clone(), b.clone());
        let sum = &a + &b;
        prop_assert_eq!(sum.len(), a.len() + b.len());
        prop_assert_eq!(&sum.gates()[..a.len()], a.gates());
        prop_assert_eq!(&sum.gates()[a.len()..], b.gates());
        prop_assert_eq!(a, a_before);
        prop_assert_eq!(b, b_before);
    }

    #[test]
    fn append_gate_adds_last(mut circuit in arb_circuit(), gate in arb_gate()) {
        let len = circuit.len();
        circuit += gate.clone();
        prop_assert_eq!(circuit.len(), len + 1);
        prop_assert_eq!(circuit.gates().last(), Some(&gate));
    }

    #[test]
    fn extract_selects_free_parameters(circuit in arb_circuit()) {
        let params = circuit.extract_parameters();
        let expected: Vec<usize> = circuit
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_parametrized() && !g.is_frozen())
            .map(|(i, _)| i)
            .collect();
        let positions: Vec<usize> = params.positions().collect();
        prop_assert_eq!(positions, expected);
        for (position, value) in params.entries() {
            prop_assert_eq!(circuit[*position].parameter(), Some(value));
        }
    }

    #[test]
    fn rejected_angle_change_leaves_circuit_intact(
        mut circuit in arb_circuit(),
        value in arb_parameter(),
    ) {
        let before = circuit.clone();
        let target = circuit
            .iter()
            .position(|g| !g.is_parametrized() || g.is_frozen());
        prop_assume!(target.is_some());
        let target = target.unwrap_or_default();

        let mut request: Vec<_> = circuit.extract_parameters().into_entries();
        request.push((target, value));

        let err = circuit.change_angles(&request).unwrap_err();
        if circuit[target].is_parametrized() {
            let is_frozen_error = matches!(err, IrError::FrozenGate { .. });
            prop_assert!(is_frozen_error);
        } else {
            let is_unparametrized_error = matches!(err, IrError::UnparametrizedGate { .. });
            prop_assert!(is_unparametrized_error);
        }
        prop_assert_eq!(circuit, before);
    }

    #[test]
    fn replace_gate_length(circuit in arb_circuit(), new in prop::collection::vec(arb_gate(), 0..4)) {
        prop_assume!(!circuit.is_empty());
        let position = circuit.len() / 2;
        let replaced = circuit.replace_gate(position, new.clone()).unwrap();
        prop_assert_eq!(replaced.len(), circuit.len() - 1 + new.len());
        prop_assert_eq!(&replaced.gates()[..position], &circuit.gates()[..position]);
        prop_assert_eq!(&replaced.gates()[position..position + new.len()], new.as_slice());
        prop_assert_eq!(replaced.weight(), circuit.weight());
    }

    #[test]
    fn max_qubit_bounds_every_gate(circuit in arb_circuit()) {
        let max = circuit.max_qubit();
        for gate in &circuit {
            prop_assert!(gate.max_qubit() <= max);
        }
    }
}

#[test]
fn scenario_single_free_parameter() {
    let circuit = Circuit::from_gates(vec![h(0), ry("a", 1), x(2)]);
    let params = circuit.extract_parameters();
    assert_eq!(params.entries(), &[(1, ParameterExpression::symbol("a"))]);
}

#[test]
fn scenario_replace_middle_gate() {
    let (g0, ga, g2) = (h(0), rx("a", 1), x(2));
    let (g1, g2_new) = (rz(0.5, 1), ry("b", 1));
    let circuit = Circuit::from_gates(vec![g0.clone(), ga, g2.clone()]);
    let replaced = circuit
        .replace_gate(1, vec![g1.clone(), g2_new.clone()])
        .unwrap();
    assert_eq!(replaced.gates(), &[g0, g1, g2_new, g2]);
}

#[test]
fn scenario_insert_into_empty() {
    let mut circuit = Circuit::new();
    circuit.insert_gate(0, h(0)).unwrap();
    assert_eq!(circuit, Circuit::wrap(h(0)));
}

#[test]
fn scenario_weight_breaks_equality() {
    let gates = vec![h(0), cnot(0, 1)];
    let a = Circuit::from_gates(gates.clone());
    let b = Circuit::from_gates(gates).with_weight(2.0);
    assert_ne!(a, b);
}
