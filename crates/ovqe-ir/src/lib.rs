//! Parameterized Quantum Circuit Intermediate Representation
//!
//! This crate provides the circuit representation consumed by variational
//! simulation and optimization layers. It does not simulate anything; it
//! builds, edits and reverses gate sequences and exposes their free
//! parameters.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing the register
//! - **Parameters**: [`ParameterExpression`] for fixed and named gate parameters
//! - **Gates**: [`Gate`] with target/control qubits, an optional parameter and a
//!   frozen flag; factory functions live in [`gate`]
//! - **Circuit**: [`Circuit`], an ordered, weighted gate sequence
//! - **Angles**: [`ExtractedParameters`] and [`AngleAssignment`] for the
//!   optimizer round trip
//!
//! # Example: Composing and Reversing
//!
//! ```rust
//! use ovqe_ir::Circuit;
//! use ovqe_ir::gate::{cnot, h, ry};
//!
//! let mut circuit = h(0) + ry("a", 1);
//! circuit += cnot(0, 1);
//!
//! let adjoint = circuit.dagger();
//! assert_eq!(adjoint.len(), 3);
//! assert_eq!(adjoint.dagger(), circuit);
//! assert_eq!(circuit.max_qubit(), 1);
//! ```
//!
//! # Example: Optimizer Round Trip
//!
//! ```rust
//! use ovqe_ir::Circuit;
//! use ovqe_ir::gate::{h, rx, rz};
//!
//! let mut circuit = Circuit::from_gates(vec![rx("a", 0), h(0), rz(0.1, 0).frozen()]);
//!
//! // Only the unfrozen rotation is exposed
//! let mut params = circuit.extract_parameters();
//! assert_eq!(params.positions().collect::<Vec<_>>(), vec![0]);
//!
//! params.assign([0.25]).unwrap();
//! circuit.apply_parameters(&params).unwrap();
//! assert_eq!(circuit[0].parameter().and_then(|p| p.as_f64()), Some(0.25));
//! ```

pub mod angles;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod parameter;
pub mod qubit;

pub use angles::{AngleAssignment, ExtractedParameters, parse_angle_pairs};
pub use circuit::{Circuit, InsertPosition, Operation};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind};
pub use parameter::ParameterExpression;
pub use qubit::QubitId;
