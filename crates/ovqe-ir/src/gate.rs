//! Quantum gate types.

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// The operation a gate applies to its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// SWAP gate.
    Swap,
    /// Rotation around X, angle taken from the gate parameter.
    Rx,
    /// Rotation around Y, angle taken from the gate parameter.
    Ry,
    /// Rotation around Z, angle taken from the gate parameter.
    Rz,
    /// Phase gate, phase taken from the gate parameter.
    Phase,
    /// A user-defined gate.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::I => "id",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::H => "h",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::SX => "sx",
            GateKind::SXdg => "sxdg",
            GateKind::Swap => "swap",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::Phase => "phase",
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Adjoint of the bare operation. Parameter sign is handled by [`Gate::dagger`].
    fn dagger(&self) -> GateKind {
        match self {
            GateKind::S => GateKind::Sdg,
            GateKind::Sdg => GateKind::S,
            GateKind::T => GateKind::Tdg,
            GateKind::Tdg => GateKind::T,
            GateKind::SX => GateKind::SXdg,
            GateKind::SXdg => GateKind::SX,
            GateKind::Custom(custom) => GateKind::Custom(custom.dagger()),
            other => other.clone(),
        }
    }
}

/// A user-defined gate, optionally carrying its unitary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of target qubits it operates on.
    pub num_qubits: u32,
    /// Optional unitary matrix (row-major, 2^n × 2^n).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Complex64>>,
    /// Set when this is the adjoint of the named gate.
    #[serde(default)]
    pub adjoint: bool,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            matrix: None,
            adjoint: false,
        }
    }

    /// Attach a unitary matrix to the gate.
    ///
    /// # Panics
    ///
    /// Panics if `matrix.len()` does not equal `(2^num_qubits)^2`.
    #[must_use]
    pub fn with_matrix(mut self, matrix: Vec<Complex64>) -> Self {
        let expected = self.dim().and_then(|dim| dim.checked_mul(dim));
        assert_eq!(
            Some(matrix.len()),
            expected,
            "Matrix length {} does not match expected {:?} for {}-qubit gate",
            matrix.len(),
            expected,
            self.num_qubits,
        );
        self.matrix = Some(matrix);
        self
    }

    /// Matrix side length `2^num_qubits`, or `None` if it does not fit in `usize`.
    fn dim(&self) -> Option<usize> {
        1usize.checked_shl(self.num_qubits)
    }

    /// Conjugate transpose: flips the adjoint flag and the stored matrix.
    ///
    /// A matrix whose length is not `(2^num_qubits)^2` cannot be transposed
    /// and is carried over unchanged.
    fn dagger(&self) -> CustomGate {
        let matrix = self.matrix.as_ref().map(|m| {
            let Some(dim) = self.dim().filter(|dim| dim.checked_mul(*dim) == Some(m.len())) else {
                return m.clone();
            };
            let mut out = vec![Complex64::new(0.0, 0.0); m.len()];
            for row in 0..dim {
                for col in 0..dim {
                    out[col * dim + row] = m[row * dim + col].conj();
                }
            }
            out
        });
        CustomGate {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            matrix,
            adjoint: !self.adjoint,
        }
    }
}

/// A single circuit operation: kind, target and control qubits, and an
/// optional parameter that an optimizer may rewrite unless the gate is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Target qubits.
    pub targets: Vec<QubitId>,
    /// Control qubits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<QubitId>,
    /// The gate parameter, numeric or named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter: Option<ParameterExpression>,
    /// Frozen gates keep their parameter fixed.
    #[serde(default)]
    frozen: bool,
}

impl Gate {
    /// Create an unparametrized gate.
    pub fn new(kind: GateKind, targets: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            targets: targets.into_iter().collect(),
            controls: vec![],
            parameter: None,
            frozen: false,
        }
    }

    /// Create a gate carrying a parameter.
    pub fn parametrized(
        kind: GateKind,
        parameter: impl Into<ParameterExpression>,
        targets: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        Self::new(kind, targets).with_parameter(parameter)
    }

    /// Add control qubits.
    #[must_use]
    pub fn with_controls(mut self, controls: impl IntoIterator<Item = QubitId>) -> Self {
        self.controls = controls.into_iter().collect();
        self
    }

    /// Set the parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<ParameterExpression>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Mark the parameter as fixed.
    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// The current parameter, if any.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        self.parameter.as_ref()
    }

    /// Whether the gate has a parameter, numeric or named.
    pub fn is_parametrized(&self) -> bool {
        self.parameter.is_some()
    }

    /// Whether the parameter is write-protected.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Overwrite the parameter.
    ///
    /// Fails without touching the gate if it has no parameter or is frozen.
    pub fn set_parameter(&mut self, value: impl Into<ParameterExpression>) -> IrResult<()> {
        let value = value.into();
        self.check_writable(None, &value)?;
        self.parameter = Some(value);
        Ok(())
    }

    /// Validate that a write of `value` would succeed. `position` is the
    /// circuit position of the request, if it came through a circuit.
    pub(crate) fn check_writable(
        &self,
        position: Option<usize>,
        value: &ParameterExpression,
    ) -> IrResult<()> {
        if !self.is_parametrized() {
            return Err(IrError::UnparametrizedGate {
                gate: self.to_string(),
                position,
                value: value.to_string(),
            });
        }
        if self.frozen {
            return Err(IrError::FrozenGate {
                gate: self.to_string(),
                position,
                value: value.to_string(),
            });
        }
        Ok(())
    }

    /// Unchecked write, used once the caller has validated the request.
    pub(crate) fn replace_parameter(&mut self, value: ParameterExpression) {
        self.parameter = Some(value);
    }

    /// Largest qubit index among targets and controls.
    pub fn max_qubit(&self) -> u32 {
        self.targets
            .iter()
            .chain(&self.controls)
            .map(|q| q.0)
            .max()
            .unwrap_or(0)
    }

    /// The adjoint gate.
    ///
    /// Rotations negate their angle, S/T/SX swap with their daggered
    /// forms, custom gates conjugate-transpose their matrix, and the
    /// remaining kinds are self-adjoint. Frozen state and qubits carry over.
    #[must_use]
    pub fn dagger(&self) -> Gate {
        let parameter = match (&self.kind, &self.parameter) {
            (GateKind::Custom(_), p) => p.clone(),
            (_, Some(p)) => Some(p.negated()),
            (_, None) => None,
        };
        Gate {
            kind: self.kind.dagger(),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
            parameter,
            frozen: self.frozen,
        }
    }
}

fn write_qubits(f: &mut fmt::Formatter<'_>, qubits: &[QubitId]) -> fmt::Result {
    write!(f, "[")?;
    for (i, q) in qubits.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{q}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let GateKind::Custom(CustomGate { adjoint: true, .. }) = self.kind {
            write!(f, "†")?;
        }
        write!(f, "(target=")?;
        write_qubits(f, &self.targets)?;
        if !self.controls.is_empty() {
            write!(f, ", control=")?;
            write_qubits(f, &self.controls)?;
        }
        if let Some(p) = &self.parameter {
            write!(f, ", parameter={p}")?;
        }
        if self.frozen {
            write!(f, ", frozen")?;
        }
        write!(f, ")")
    }
}

/// Pauli-X on `target`.
pub fn x(target: u32) -> Gate {
    Gate::new(GateKind::X, [QubitId(target)])
}

/// Pauli-Y on `target`.
pub fn y(target: u32) -> Gate {
    Gate::new(GateKind::Y, [QubitId(target)])
}

/// Pauli-Z on `target`.
pub fn z(target: u32) -> Gate {
    Gate::new(GateKind::Z, [QubitId(target)])
}

/// Hadamard on `target`.
pub fn h(target: u32) -> Gate {
    Gate::new(GateKind::H, [QubitId(target)])
}

/// S gate on `target`.
pub fn s(target: u32) -> Gate {
    Gate::new(GateKind::S, [QubitId(target)])
}

/// T gate on `target`.
pub fn t(target: u32) -> Gate {
    Gate::new(GateKind::T, [QubitId(target)])
}

/// X rotation.
pub fn rx(angle: impl Into<ParameterExpression>, target: u32) -> Gate {
    Gate::parametrized(GateKind::Rx, angle, [QubitId(target)])
}

/// Y rotation.
pub fn ry(angle: impl Into<ParameterExpression>, target: u32) -> Gate {
    Gate::parametrized(GateKind::Ry, angle, [QubitId(target)])
}

/// Z rotation.
pub fn rz(angle: impl Into<ParameterExpression>, target: u32) -> Gate {
    Gate::parametrized(GateKind::Rz, angle, [QubitId(target)])
}

/// Phase gate.
pub fn phase(angle: impl Into<ParameterExpression>, target: u32) -> Gate {
    Gate::parametrized(GateKind::Phase, angle, [QubitId(target)])
}

/// Controlled-X.
pub fn cnot(control: u32, target: u32) -> Gate {
    x(target).with_controls([QubitId(control)])
}

/// SWAP.
pub fn swap(a: u32, b: u32) -> Gate {
    Gate::new(GateKind::Swap, [QubitId(a), QubitId(b)])
}
