//! Gate parameters: fixed numeric values, named variables, and expressions over both.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A numeric or named gate parameter.
///
/// Optimizers address named parameters by their symbol and numeric ones by
/// the position of the owning gate (see [`crate::Circuit::extract_parameters`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A fixed numeric value.
    Constant(f64),
    /// A named variable.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a fixed numeric parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a named parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression references any named variable.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to a concrete value.
    ///
    /// Returns `None` if a named variable is unbound or a divisor is zero.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Names of all variables referenced by this expression.
    pub fn symbols(&self) -> FxHashSet<String> {
        let mut set = FxHashSet::default();
        self.collect_symbols(&mut set);
        set
    }

    pub(crate) fn collect_symbols(&self, set: &mut FxHashSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Substitute `value` for every occurrence of the variable `name`.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        self.map_leaves(&|leaf| match leaf {
            ParameterExpression::Symbol(n) if n == name => Some(ParameterExpression::Constant(value)),
            _ => None,
        })
    }

    /// Rebuild the tree, replacing each leaf for which `f` returns `Some`.
    fn map_leaves(&self, f: &impl Fn(&Self) -> Option<Self>) -> Self {
        let binary = |a: &Self, b: &Self| (Box::new(a.map_leaves(f)), Box::new(b.map_leaves(f)));
        match self {
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::Symbol(_) => f(self).unwrap_or_else(|| self.clone()),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.map_leaves(f))),
            ParameterExpression::Add(a, b) => {
                let (a, b) = binary(a, b);
                ParameterExpression::Add(a, b)
            }
            ParameterExpression::Sub(a, b) => {
                let (a, b) = binary(a, b);
                ParameterExpression::Sub(a, b)
            }
            ParameterExpression::Mul(a, b) => {
                let (a, b) = binary(a, b);
                ParameterExpression::Mul(a, b)
            }
            ParameterExpression::Div(a, b) => {
                let (a, b) = binary(a, b);
                ParameterExpression::Div(a, b)
            }
        }
    }

    /// Fold constant subexpressions into a single value.
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        match self {
            ParameterExpression::Neg(e) => e.simplify().negated(),
            ParameterExpression::Add(a, b) => {
                ParameterExpression::Add(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Sub(a, b) => {
                ParameterExpression::Sub(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Mul(a, b) => {
                ParameterExpression::Mul(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Div(a, b) => {
                ParameterExpression::Div(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            _ => self.clone(),
        }
    }

    /// Flip the sign of this parameter, as required for a rotation adjoint.
    ///
    /// Constants are negated directly and a double negation collapses, so
    /// `p.negated().negated() == p` for every expression.
    pub fn negated(&self) -> Self {
        match self {
            ParameterExpression::Constant(v) => ParameterExpression::Constant(-v),
            ParameterExpression::Neg(e) => (**e).clone(),
            _ => ParameterExpression::Neg(Box::new(self.clone())),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        ParameterExpression::Symbol(name.to_string())
    }
}

impl From<String> for ParameterExpression {
    fn from(name: String) -> Self {
        ParameterExpression::Symbol(name)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_parameter() {
        let p = ParameterExpression::from("a");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(p.symbols().contains("a"));
    }

    #[test]
    fn test_bind_inside_expression() {
        let p = ParameterExpression::symbol("theta") * ParameterExpression::constant(2.0);
        let bound = p.bind("theta", 0.25);
        assert!(!bound.is_symbolic());
        assert_eq!(bound.simplify(), ParameterExpression::Constant(0.5));

        let untouched = p.bind("phi", 1.0);
        assert_eq!(untouched, p);
    }

    #[test]
    fn test_negated_is_involution() {
        let exprs = [
            ParameterExpression::constant(1.5),
            ParameterExpression::constant(-0.0),
            ParameterExpression::symbol("a"),
            ParameterExpression::pi(),
            ParameterExpression::symbol("a") + ParameterExpression::constant(1.0),
            -ParameterExpression::symbol("b"),
        ];
        for p in exprs {
            assert_eq!(p.negated().negated(), p);
        }
    }

    #[test]
    fn test_negated_constant_folds() {
        assert_eq!(
            ParameterExpression::constant(0.3).negated(),
            ParameterExpression::Constant(-0.3)
        );
        assert_eq!(
            ParameterExpression::pi().negated().as_f64(),
            Some(-PI)
        );
    }

    #[test]
    fn test_division_by_zero_is_unevaluated() {
        let p = ParameterExpression::constant(1.0) / ParameterExpression::constant(0.0);
        assert_eq!(p.as_f64(), None);
    }

    #[test]
    fn test_display() {
        let p = ParameterExpression::symbol("a") + ParameterExpression::constant(1.0);
        assert_eq!(p.to_string(), "(a + 1)");
        assert_eq!(ParameterExpression::symbol("a").negated().to_string(), "-(a)");
    }
}
