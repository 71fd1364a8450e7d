//! A [Variable] is the base element used to create a [LinearExpression].
//! The goal of the solver is to find optimal values for all variables in a model.
//!
//! Each variable has a [VariableDefinition] that sets its name, bounds and [Domain].
use std::fmt::{self, Display, Formatter};
use std::ops::{Div, Mul, Neg};
use std::str::FromStr;

use fnv::FnvHashMap as HashMap;

use crate::error::ModelError;
use crate::expression::LinearExpression;

/// A variable in a model. Use variables to create [expressions](LinearExpression),
/// to express the objective and the constraints of your model.
///
/// Variables are created using [Model::create_variable](crate::Model::create_variable).
///
/// ## Warning
/// `Eq` is implemented on this type, but
/// `v1 == v2` is true only if the two variables represent the same object,
/// not if they have the same definition.
///
/// ```
/// # use product_mix::{Domain, Model};
/// let mut model = Model::new("example");
/// let v1 = model.create_variable("v1", 0., Domain::Integer)?;
/// let v2 = model.create_variable("v2", 0., Domain::Integer)?;
/// assert_ne!(v1, v2);
///
/// let v1_copy = v1;
/// assert_eq!(v1, v1_copy);
/// # Ok::<_, product_mix::ModelError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// Identity of the model that created the variable.
    /// Prevents using the variables from one model inside another one.
    model: u32,
    /// A variable is nothing more than an index into the `variables` field of a Model.
    /// That's why it can be `Copy`.
    index: usize,
}

impl Variable {
    /// No one should use this method outside of [Model](crate::Model)
    pub(crate) fn at(model: u32, index: usize) -> Self {
        Self { model, index }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn model(&self) -> u32 {
        self.model
    }
}

/// The set of values a variable may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Any real number between the bounds
    Continuous,
    /// Any integer between the bounds
    Integer,
    /// 0 or 1
    Binary,
}

impl Domain {
    /// Whether the solver must assign an integral value
    pub fn is_integer(self) -> bool {
        matches!(self, Domain::Integer | Domain::Binary)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Domain::Continuous => "continuous",
            Domain::Integer => "integer",
            Domain::Binary => "binary",
        })
    }
}

/// ```
/// # use product_mix::Domain;
/// assert_eq!("Integer".parse::<Domain>(), Ok(Domain::Integer));
/// assert!("complex".parse::<Domain>().is_err());
/// ```
impl FromStr for Domain {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" | "real" => Ok(Domain::Continuous),
            "integer" | "int" | "general" => Ok(Domain::Integer),
            "binary" | "bin" => Ok(Domain::Binary),
            _ => Err(ModelError::InvalidDomain(s.to_string())),
        }
    }
}

/// Defines the properties of a variable: its name, its bounds and its domain.
#[derive(Clone, PartialEq, Debug)]
pub struct VariableDefinition {
    pub(crate) name: String,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) domain: Domain,
}

impl VariableDefinition {
    /// Creates a non-negative continuous variable with no upper bound
    pub fn new<S: Into<String>>(name: S) -> Self {
        VariableDefinition {
            name: name.into(),
            min: 0.,
            max: f64::INFINITY,
            domain: Domain::Continuous,
        }
    }

    /// Set the lower bound of the variable
    pub fn min<N: Into<f64>>(mut self, min: N) -> Self {
        self.min = min.into();
        self
    }

    /// Set the upper bound of the variable
    pub fn max<N: Into<f64>>(mut self, max: N) -> Self {
        self.max = max.into();
        self
    }

    /// Set both the lower and upper bounds of the variable
    pub fn clamp<N1: Into<f64>, N2: Into<f64>>(self, min: N1, max: N2) -> Self {
        self.min(min).max(max)
    }

    /// Set the domain of the variable.
    /// A binary domain also restricts the upper bound to 1.
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        if domain == Domain::Binary {
            self.max = self.max.min(1.);
        }
        self
    }

    /// Shorthand for `.domain(Domain::Integer)`
    pub fn integer(self) -> Self {
        self.domain(Domain::Integer)
    }

    /// The variable name, as given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower bound
    pub fn lower_bound(&self) -> f64 {
        self.min
    }

    /// The upper bound, `f64::INFINITY` when there is none
    pub fn upper_bound(&self) -> f64 {
        self.max
    }

    /// The domain
    pub fn get_domain(&self) -> Domain {
        self.domain
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidBound {
            name: self.name.clone(),
            reason,
        };
        if !self.min.is_finite() {
            return Err(invalid(format!("lower bound {} is not finite", self.min)));
        }
        if self.max.is_nan() || self.max == f64::NEG_INFINITY {
            return Err(invalid(format!("upper bound {} is not usable", self.max)));
        }
        if self.min > self.max {
            return Err(invalid(format!(
                "lower bound {} is above upper bound {}",
                self.min, self.max
            )));
        }
        if self.domain == Domain::Binary && (self.min < 0. || self.max > 1.) {
            return Err(invalid(format!(
                "binary variables must stay within [0, 1], got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl<N: Into<f64>> Mul<N> for Variable {
    type Output = LinearExpression;

    fn mul(self, rhs: N) -> Self::Output {
        let mut coefficients = HashMap::with_capacity_and_hasher(1, Default::default());
        coefficients.insert(self, rhs.into());
        LinearExpression {
            coefficients,
            constant: 0.0,
        }
    }
}

impl Mul<Variable> for f64 {
    type Output = LinearExpression;

    fn mul(self, rhs: Variable) -> Self::Output {
        rhs.mul(self)
    }
}

impl Mul<Variable> for i32 {
    type Output = LinearExpression;

    fn mul(self, rhs: Variable) -> Self::Output {
        rhs.mul(f64::from(self))
    }
}

impl Div<f64> for Variable {
    type Output = LinearExpression;
    fn div(self, rhs: f64) -> Self::Output {
        self * (1. / rhs)
    }
}

impl Div<i32> for Variable {
    type Output = LinearExpression;
    fn div(self, rhs: i32) -> Self::Output {
        self * (1. / f64::from(rhs))
    }
}

impl Neg for Variable {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        self * -1.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_domain_clamps_upper_bound() {
        let def = VariableDefinition::new("b").domain(Domain::Binary);
        assert_eq!(def.upper_bound(), 1.);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let def = VariableDefinition::new("x").clamp(3, 2);
        assert!(matches!(
            def.validate(),
            Err(ModelError::InvalidBound { name, .. }) if name == "x"
        ));
    }

    #[test]
    fn rejects_infinite_lower_bound() {
        let def = VariableDefinition::new("x").min(f64::NEG_INFINITY);
        assert!(def.validate().is_err());
    }

    #[test]
    fn parses_domains() {
        assert_eq!("general".parse::<Domain>(), Ok(Domain::Integer));
        assert_eq!(" BIN ".parse::<Domain>(), Ok(Domain::Binary));
        assert_eq!(
            "semicontinuous".parse::<Domain>(),
            Err(ModelError::InvalidDomain("semicontinuous".into()))
        );
    }
}
