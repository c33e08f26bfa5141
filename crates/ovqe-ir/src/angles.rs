//! Position-addressed parameter views exchanged with optimizers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;

/// A `(position, value)` request: write `value` into the gate at `position`.
pub type AngleAssignment = (usize, ParameterExpression);

/// The free parameters of a circuit, as `(position, value)` pairs in
/// ascending position order.
///
/// Positions are only meaningful for the circuit revision they were
/// extracted at. [`crate::Circuit::apply_parameters`] refuses a view whose
/// revision no longer matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedParameters {
    revision: u64,
    entries: Vec<AngleAssignment>,
}

impl ExtractedParameters {
    pub(crate) fn new(revision: u64, entries: Vec<AngleAssignment>) -> Self {
        Self { revision, entries }
    }

    /// Circuit revision the positions refer to.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The `(position, value)` pairs.
    pub fn entries(&self) -> &[AngleAssignment] {
        &self.entries
    }

    /// Gate positions, ascending.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    /// Number of free parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the circuit has no free parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite the values, keeping positions and revision.
    ///
    /// `values` is matched to entries in position order and must have the
    /// same length.
    pub fn assign<I, V>(&mut self, values: I) -> IrResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterExpression>,
    {
        let values: Vec<ParameterExpression> = values.into_iter().map(Into::into).collect();
        if values.len() != self.entries.len() {
            return Err(IrError::MalformedAngles(format!(
                "expected {} values, got {}",
                self.entries.len(),
                values.len()
            )));
        }
        for (entry, value) in self.entries.iter_mut().zip(values) {
            entry.1 = value;
        }
        Ok(())
    }

    /// Consume the view, returning the pairs.
    pub fn into_entries(self) -> Vec<AngleAssignment> {
        self.entries
    }
}

/// Parse untyped optimizer output into angle assignments.
///
/// Accepts a JSON array of two-element arrays `[position, value]`, where
/// `position` is a non-negative integer and `value` is a number (fixed
/// angle) or a string (named parameter).
pub fn parse_angle_pairs(value: &Value) -> IrResult<Vec<AngleAssignment>> {
    let Value::Array(items) = value else {
        return Err(IrError::MalformedAngles(format!(
            "angles must be a list, got {value}"
        )));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_pair(i, item))
        .collect()
}

fn parse_pair(i: usize, item: &Value) -> IrResult<AngleAssignment> {
    let Some([position, angle]) = item.as_array().map(Vec::as_slice) else {
        return Err(IrError::MalformedAngles(format!(
            "entry {i}: {item} is not a [position, value] pair"
        )));
    };
    let position = position
        .as_u64()
        .and_then(|p| usize::try_from(p).ok())
        .ok_or_else(|| {
            IrError::MalformedAngles(format!(
                "entry {i}: position {position} is not a non-negative integer"
            ))
        })?;
    let angle = match angle {
        Value::Number(n) => n.as_f64().map(ParameterExpression::Constant),
        Value::String(name) => Some(ParameterExpression::symbol(name.as_str())),
        _ => None,
    }
    .ok_or_else(|| {
        IrError::MalformedAngles(format!(
            "entry {i}: value {angle} is neither a number nor a parameter name"
        ))
    })?;
    Ok((position, angle))
}
