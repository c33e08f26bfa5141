//! Weighted, ordered gate sequences.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::angles::{AngleAssignment, ExtractedParameters, parse_angle_pairs};
use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// Either a single gate or a whole circuit.
///
/// Composition and insertion accept both; [`Operation::into_circuit`]
/// normalizes a bare gate into a one-gate circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A single gate.
    Gate(Gate),
    /// A gate sequence.
    Circuit(Circuit),
}

impl Operation {
    /// Promote to a circuit. Circuits pass through unchanged.
    pub fn into_circuit(self) -> Circuit {
        match self {
            Operation::Gate(gate) => Circuit::from_gates(vec![gate]),
            Operation::Circuit(circuit) => circuit,
        }
    }

    fn into_gates(self) -> Vec<Gate> {
        match self {
            Operation::Gate(gate) => vec![gate],
            Operation::Circuit(circuit) => circuit.gates,
        }
    }
}

impl From<Gate> for Operation {
    fn from(gate: Gate) -> Self {
        Operation::Gate(gate)
    }
}

impl From<&Gate> for Operation {
    fn from(gate: &Gate) -> Self {
        Operation::Gate(gate.clone())
    }
}

impl From<Circuit> for Operation {
    fn from(circuit: Circuit) -> Self {
        Operation::Circuit(circuit)
    }
}

impl From<&Circuit> for Operation {
    fn from(circuit: &Circuit) -> Self {
        Operation::Circuit(circuit.clone())
    }
}

/// Where [`Circuit::insert_gate`] places new gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the gate currently at this position; `len()` appends.
    At(usize),
    /// A uniformly sampled position in `0..len()`.
    Random,
}

impl From<usize> for InsertPosition {
    fn from(position: usize) -> Self {
        InsertPosition::At(position)
    }
}

/// A quantum circuit: gates in application order plus a scalar weight.
///
/// The weight records the circuit's coefficient when it is one term of a
/// weighted sum of circuits; it is never folded into gate parameters.
///
/// Gate positions are the only handle optimizers hold on parameters.
/// Every newly built circuit and every edit that shifts positions (insert,
/// replace, remove) takes a fresh, process-wide unique [`Circuit::revision`],
/// so [`ExtractedParameters`] taken from another circuit or an older layout
/// are rejected instead of being written to the wrong gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    gates: Vec<Gate>,
    weight: f64,
    #[serde(skip, default = "next_revision")]
    revision: u64,
}

/// Source of layout stamps. Never reused within a process.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

impl Circuit {
    /// Create an empty circuit with weight 1.
    pub fn new() -> Self {
        Self::from_gates(vec![])
    }

    /// Create a circuit from a gate list with weight 1.
    pub fn from_gates(gates: Vec<Gate>) -> Self {
        Self {
            gates,
            weight: 1.0,
            revision: next_revision(),
        }
    }

    /// Set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Promote a gate to a one-gate circuit; circuits pass through.
    pub fn wrap(item: impl Into<Operation>) -> Circuit {
        item.into().into_circuit()
    }

    /// The gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Iterate over the gates.
    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.gates.iter()
    }

    /// The gate at `position`, if any.
    pub fn get(&self, position: usize) -> Option<&Gate> {
        self.gates.get(position)
    }

    /// Mutable access to the gate at `position`, if any.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Gate> {
        self.gates.get_mut(position)
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True when the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The circuit weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Change the circuit weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Layout stamp: unique to this circuit's gate positions.
    ///
    /// Clones share it until either side is structurally edited; a freshly
    /// built, composed, reversed or deserialized circuit gets a new one.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump_revision(&mut self) {
        self.revision = next_revision();
    }

    fn check_position(&self, position: usize) -> IrResult<()> {
        if position >= self.gates.len() {
            return Err(IrError::PositionOutOfRange {
                position,
                len: self.gates.len(),
            });
        }
        Ok(())
    }

    /// Replace the gate at `position` with a single gate, returning the old one.
    ///
    /// Positions of other gates are unchanged, so the revision is kept.
    pub fn set_gate(&mut self, position: usize, gate: Gate) -> IrResult<Gate> {
        self.check_position(position)?;
        Ok(std::mem::replace(&mut self.gates[position], gate))
    }

    // ---------------------------------------------------------------------
    // Composition
    // ---------------------------------------------------------------------

    /// A new circuit with `self`'s gates followed by `other`'s.
    ///
    /// Neither operand is modified. Weights are not combined: the result
    /// has weight 1.
    pub fn concat(&self, other: impl Into<Operation>) -> Circuit {
        let mut gates = self.gates.clone();
        gates.extend(other.into().into_gates());
        Circuit::from_gates(gates)
    }

    /// Append a gate, or every gate of a circuit, to the end of `self`.
    ///
    /// Existing positions are untouched, so the revision is kept.
    pub fn append(&mut self, other: impl Into<Operation>) -> &mut Self {
        let gates = other.into().into_gates();
        trace!(added = gates.len(), len = self.gates.len(), "Appending gates");
        self.gates.extend(gates);
        self
    }

    /// The adjoint circuit: gates in reverse order, each replaced by its
    /// own adjoint. The weight is carried over.
    #[must_use]
    pub fn dagger(&self) -> Circuit {
        let gates = self.gates.iter().rev().map(Gate::dagger).collect();
        Circuit::from_gates(gates).with_weight(self.weight)
    }

    // ---------------------------------------------------------------------
    // Structural editing
    // ---------------------------------------------------------------------

    fn spliced(&self, position: usize, replacement: Vec<Gate>) -> IrResult<Vec<Gate>> {
        self.check_position(position)?;
        let mut gates = Vec::with_capacity(self.gates.len() - 1 + replacement.len());
        gates.extend_from_slice(&self.gates[..position]);
        gates.extend(replacement);
        gates.extend_from_slice(&self.gates[position + 1..]);
        Ok(gates)
    }

    /// A new circuit where the gate at `position` is replaced by `gates`
    /// (zero or more), keeping the weight.
    ///
    /// Gates are treated as strictly sequential; no attempt is made to
    /// keep gates that act in parallel on disjoint qubits aligned.
    pub fn replace_gate(
        &self,
        position: usize,
        gates: impl IntoIterator<Item = Gate>,
    ) -> IrResult<Circuit> {
        let gates = self.spliced(position, gates.into_iter().collect())?;
        debug!(position, len = gates.len(), "Replaced gate in new circuit");
        Ok(Circuit {
            gates,
            weight: self.weight,
            revision: next_revision(),
        })
    }

    /// In-place variant of [`Circuit::replace_gate`].
    pub fn replace_gate_in_place(
        &mut self,
        position: usize,
        gates: impl IntoIterator<Item = Gate>,
    ) -> IrResult<&mut Self> {
        self.gates = self.spliced(position, gates.into_iter().collect())?;
        self.bump_revision();
        debug!(position, len = self.gates.len(), "Replaced gate in place");
        Ok(self)
    }

    /// Insert a gate, or a circuit's gates, using the thread-local RNG for
    /// [`InsertPosition::Random`].
    pub fn insert_gate(
        &mut self,
        position: impl Into<InsertPosition>,
        item: impl Into<Operation>,
    ) -> IrResult<&mut Self> {
        self.insert_gate_with_rng(position, item, &mut rand::thread_rng())
    }

    /// Insert before `position`.
    ///
    /// A circuit is inserted as one contiguous block in its own order.
    /// [`InsertPosition::Random`] samples once, uniformly over the current
    /// gate count; an empty circuit inserts at 0.
    pub fn insert_gate_with_rng<R: Rng>(
        &mut self,
        position: impl Into<InsertPosition>,
        item: impl Into<Operation>,
        rng: &mut R,
    ) -> IrResult<&mut Self> {
        let position = match position.into() {
            InsertPosition::At(p) if p > self.gates.len() => {
                return Err(IrError::PositionOutOfRange {
                    position: p,
                    len: self.gates.len(),
                });
            }
            InsertPosition::At(p) => p,
            InsertPosition::Random if self.gates.is_empty() => 0,
            InsertPosition::Random => rng.gen_range(0..self.gates.len()),
        };
        let gates = item.into().into_gates();
        debug!(position, count = gates.len(), "Inserting gates");
        self.gates.splice(position..position, gates);
        self.bump_revision();
        Ok(self)
    }

    /// Remove and return the gate at `position`.
    pub fn remove_gate(&mut self, position: usize) -> IrResult<Gate> {
        self.check_position(position)?;
        let gate = self.gates.remove(position);
        self.bump_revision();
        debug!(position, gate = %gate, "Removed gate");
        Ok(gate)
    }

    // ---------------------------------------------------------------------
    // Parameters
    // ---------------------------------------------------------------------

    /// `(position, parameter)` for every parametrized, unfrozen gate, in
    /// ascending position order, stamped with the current revision.
    pub fn extract_parameters(&self) -> ExtractedParameters {
        let entries = self
            .gates
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_parametrized() && !g.is_frozen())
            .filter_map(|(i, g)| g.parameter().map(|p| (i, p.clone())))
            .collect();
        ExtractedParameters::new(self.revision, entries)
    }

    /// Overwrite gate parameters from `(position, value)` pairs.
    ///
    /// Every pair is validated before anything is written, so a failing
    /// request leaves the circuit unchanged.
    #[instrument(skip(self, angles), fields(count = angles.len()))]
    pub fn change_angles(&mut self, angles: &[AngleAssignment]) -> IrResult<&mut Self> {
        for (position, value) in angles {
            let gate = self.gates.get(*position).ok_or_else(|| IrError::TooManyAngles {
                position: *position,
                len: self.gates.len(),
            })?;
            gate.check_writable(Some(*position), value)?;
        }
        for (position, value) in angles {
            self.gates[*position].replace_parameter(value.clone());
        }
        debug!("Assigned {} angles", angles.len());
        Ok(self)
    }

    /// Write back a (possibly re-valued) parameter view.
    ///
    /// Fails if the view was extracted from another circuit, or from this
    /// one before a structural edit.
    pub fn apply_parameters(&mut self, parameters: &ExtractedParameters) -> IrResult<&mut Self> {
        if parameters.revision() != self.revision {
            return Err(IrError::StaleParameters {
                extracted: parameters.revision(),
                current: self.revision,
            });
        }
        self.change_angles(parameters.entries())
    }

    /// [`Circuit::change_angles`] from untyped input such as optimizer JSON.
    #[instrument(skip_all)]
    pub fn change_angles_json(&mut self, angles: &serde_json::Value) -> IrResult<&mut Self> {
        let angles = parse_angle_pairs(angles)?;
        self.change_angles(&angles)
    }

    /// Names of the variables referenced by unfrozen gates.
    pub fn symbols(&self) -> FxHashSet<String> {
        let mut set = FxHashSet::default();
        for gate in self.gates.iter().filter(|g| !g.is_frozen()) {
            if let Some(p) = gate.parameter() {
                p.collect_symbols(&mut set);
            }
        }
        set
    }

    /// A copy with the variable `name` bound to `value` in every unfrozen gate.
    #[must_use]
    pub fn bind(&self, name: &str, value: f64) -> Circuit {
        let mut bound = self.clone();
        for gate in bound.gates.iter_mut().filter(|g| !g.is_frozen()) {
            if let Some(p) = gate.parameter() {
                let p: ParameterExpression = p.bind(name, value);
                gate.replace_parameter(p);
            }
        }
        bound
    }

    // ---------------------------------------------------------------------
    // Utilities
    // ---------------------------------------------------------------------

    /// Largest qubit index touched by any gate; 0 for an empty circuit.
    pub fn max_qubit(&self) -> u32 {
        self.gates.iter().map(Gate::max_qubit).max().unwrap_or(0)
    }

    /// Group gate positions into layers of gates that act on disjoint
    /// qubits, scheduling each gate as early as its qubits allow.
    ///
    /// This is a view only; the sequential order of `gates` is unaffected.
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let mut next_free: FxHashMap<QubitId, usize> = FxHashMap::default();
        let mut layers: Vec<Vec<usize>> = vec![];
        for (position, gate) in self.gates.iter().enumerate() {
            let qubits = || gate.targets.iter().chain(&gate.controls);
            let layer = qubits()
                .map(|q| next_free.get(q).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            for q in qubits() {
                next_free.insert(*q, layer + 1);
            }
            if layer == layers.len() {
                layers.push(vec![]);
            }
            layers[layer].push(position);
        }
        layers
    }

    /// Number of layers in [`Circuit::layers`].
    pub fn depth(&self) -> usize {
        self.layers().len()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Circuit {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.gates == other.gates
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circuit:")?;
        if self.weight != 1.0 {
            write!(f, " weight={:06.2}", self.weight)?;
        }
        writeln!(f)?;
        for gate in &self.gates {
            writeln!(f, "{gate}")?;
        }
        Ok(())
    }
}

impl Index<usize> for Circuit {
    type Output = Gate;

    fn index(&self, position: usize) -> &Gate {
        &self.gates[position]
    }
}

impl IndexMut<usize> for Circuit {
    fn index_mut(&mut self, position: usize) -> &mut Gate {
        &mut self.gates[position]
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.iter()
    }
}

impl IntoIterator for Circuit {
    type Item = Gate;
    type IntoIter = std::vec::IntoIter<Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.into_iter()
    }
}

impl FromIterator<Gate> for Circuit {
    fn from_iter<I: IntoIterator<Item = Gate>>(iter: I) -> Self {
        Circuit::from_gates(iter.into_iter().collect())
    }
}

impl Extend<Gate> for Circuit {
    fn extend<I: IntoIterator<Item = Gate>>(&mut self, iter: I) {
        self.gates.extend(iter);
    }
}

impl From<Gate> for Circuit {
    fn from(gate: Gate) -> Self {
        Circuit::wrap(gate)
    }
}

impl<T: Into<Operation>> Add<T> for Circuit {
    type Output = Circuit;

    fn add(mut self, rhs: T) -> Circuit {
        self.gates.extend(rhs.into().into_gates());
        Circuit::from_gates(self.gates)
    }
}

impl<T: Into<Operation>> Add<T> for &Circuit {
    type Output = Circuit;

    fn add(self, rhs: T) -> Circuit {
        self.concat(rhs)
    }
}

impl<T: Into<Operation>> Add<T> for Gate {
    type Output = Circuit;

    fn add(self, rhs: T) -> Circuit {
        Circuit::wrap(self) + rhs
    }
}

impl<T: Into<Operation>> AddAssign<T> for Circuit {
    fn add_assign(&mut self, rhs: T) {
        self.append(rhs);
    }
}
