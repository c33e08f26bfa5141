//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An angle assignment addressed a position past the end of the circuit.
    #[error(
        "Failed to assign angles, too many angles provided: position {position} is out of range for a circuit of {len} gates"
    )]
    TooManyAngles {
        /// The offending position.
        position: usize,
        /// Number of gates in the circuit.
        len: usize,
    },

    /// An angle assignment targeted a gate without a parameter.
    #[error(
        "You are trying to change the angle of an unparametrized gate\ngate={gate}\n{}",
        format_request(.position, .value)
    )]
    UnparametrizedGate {
        /// Rendering of the targeted gate.
        gate: String,
        /// Requested circuit position, absent for a write on a standalone gate.
        position: Option<usize>,
        /// Requested value.
        value: String,
    },

    /// An angle assignment targeted a frozen gate.
    #[error(
        "You are trying to change the angle of a frozen gate\ngate={gate}\n{}",
        format_request(.position, .value)
    )]
    FrozenGate {
        /// Rendering of the targeted gate.
        gate: String,
        /// Requested circuit position, absent for a write on a standalone gate.
        position: Option<usize>,
        /// Requested value.
        value: String,
    },

    /// The angle input was not a list of `(position, value)` pairs.
    #[error(
        "Failed to assign angles: {0}\nexpected a list of [position, value] pairs, e.g. [[0, 0.5], [3, \"theta\"]]"
    )]
    MalformedAngles(String),

    /// A structural edit addressed a position outside the circuit.
    #[error("Position {position} is out of range for a circuit of {len} gates")]
    PositionOutOfRange {
        /// The offending position.
        position: usize,
        /// Number of gates in the circuit.
        len: usize,
    },

    /// Extracted parameters were applied after the circuit was structurally edited.
    #[error(
        "Stale parameter positions: extracted at revision {extracted}, circuit is at revision {current}"
    )]
    StaleParameters {
        /// Revision the parameters were extracted at.
        extracted: u64,
        /// Current circuit revision.
        current: u64,
    },
}

/// Helper function to echo an angle request back.
#[allow(clippy::ref_option)]
fn format_request(position: &Option<usize>, value: &str) -> String {
    match position {
        Some(position) => format!("angles=({position}, {value})"),
        None => format!("parameter={value}"),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
