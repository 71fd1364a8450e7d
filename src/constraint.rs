//! Constraints define the inequalities that must hold in the solution.
use std::fmt::{self, Display, Formatter};

use crate::expression::LinearExpression;
use crate::solvers::Solution;

/// The relation between the left hand side expression and the right hand side bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// expression <= rhs
    LessOrEqual,
    /// expression >= rhs
    GreaterOrEqual,
    /// expression == rhs
    Equal,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "=",
        })
    }
}

/// A constraint represents a single labelled (in)equality that must hold in the solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub(crate) expression: LinearExpression,
    pub(crate) operator: Operator,
    pub(crate) rhs: f64,
    pub(crate) label: String,
}

impl Constraint {
    /// The left hand side, as given when the constraint was added
    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    /// The comparison operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The right hand side, as given when the constraint was added
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// The bound on the variable terms only, once the expression constant
    /// has been moved to the right hand side.
    pub fn bound(&self) -> f64 {
        self.rhs - self.expression.constant
    }

    /// The human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the given values satisfy this constraint, up to `tolerance`
    pub fn is_satisfied_by<S: Solution>(&self, values: &S, tolerance: f64) -> bool {
        let lhs = self.expression.eval_with(values);
        match self.operator {
            Operator::LessOrEqual => lhs <= self.rhs + tolerance,
            Operator::GreaterOrEqual => lhs >= self.rhs - tolerance,
            Operator::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}
