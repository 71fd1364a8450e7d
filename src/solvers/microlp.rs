//! A solver that uses [microlp](https://docs.rs/microlp), a pure rust solver.
//! It is the default backend, and the only one that needs nothing installed.

use crate::constraint::Operator;
use crate::error::SolveError;
use crate::model::{Model, Sense};
use crate::solvers::{objective_columns, SolveResult, SolveStatus, Solver, SolverConfig};

/// The [microlp](https://docs.rs/microlp) solver.
/// Integer variables are handled by microlp's own branch and bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLp;

impl Solver for MicroLp {
    fn name(&self) -> &'static str {
        "Microlp"
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        if config.time_limit.is_some() || config.mip_gap.is_some() {
            tracing::warn!(
                backend = self.name(),
                "time limit and MIP gap are not supported and will be ignored"
            );
        }
        let objective = model.require_objective()?;
        let mut problem = microlp::Problem::new(match objective.sense {
            Sense::Maximise => microlp::OptimizationDirection::Maximize,
            Sense::Minimise => microlp::OptimizationDirection::Minimize,
        });
        let coefficients = objective_columns(model)?;
        let mut columns: Vec<microlp::Variable> = Vec::with_capacity(model.len());
        for ((_, def), coeff) in model.variables().zip(coefficients) {
            let column = if def.domain.is_integer() {
                match integer_bounds(def.min, def.max) {
                    Ok(Some(bounds)) => problem.add_integer_var(coeff, bounds),
                    // no integer between the bounds
                    Ok(None) => return Ok(SolveResult::without_solution(SolveStatus::Infeasible)),
                    Err(message) => {
                        return Err(SolveError::Backend {
                            backend: self.name(),
                            message: format!("variable '{}': {}", def.name, message),
                        })
                    }
                }
            } else {
                problem.add_var(coeff, (def.min, def.max))
            };
            columns.push(column);
        }
        for constraint in model.constraints() {
            let op = match constraint.operator {
                Operator::LessOrEqual => microlp::ComparisonOp::Le,
                Operator::GreaterOrEqual => microlp::ComparisonOp::Ge,
                Operator::Equal => microlp::ComparisonOp::Eq,
            };
            let mut linear_expr = microlp::LinearExpr::empty();
            for (var, coefficient) in constraint.expression.sorted_terms() {
                linear_expr.add(columns[var.index()], coefficient);
            }
            problem.add_constraint(linear_expr, op, constraint.bound());
        }
        match problem.solve() {
            Ok(solution) => {
                let values = columns.iter().map(|&col| solution[col]).collect();
                SolveResult::optimal(model, values)
            }
            Err(microlp::Error::Infeasible) => {
                Ok(SolveResult::without_solution(SolveStatus::Infeasible))
            }
            Err(microlp::Error::Unbounded) => {
                Ok(SolveResult::without_solution(SolveStatus::Unbounded))
            }
            Err(microlp::Error::InternalError(message)) => {
                tracing::warn!(backend = self.name(), %message, "solver stopped without a result");
                Ok(SolveResult::without_solution(SolveStatus::Undefined))
            }
        }
    }
}

/// The integers within `[min, max]`, as the `i32` range microlp expects.
/// An infinite upper bound saturates; `None` when the range holds no integer.
fn integer_bounds(min: f64, max: f64) -> Result<Option<(i32, i32)>, String> {
    let to_i32 = |bound: f64| {
        if bound < f64::from(i32::MIN) || bound > f64::from(i32::MAX) {
            Err(format!("integer bound {} does not fit in an i32", bound))
        } else {
            Ok(bound as i32)
        }
    };
    let (low, high) = (min.ceil(), max.floor());
    if low > high {
        return Ok(None);
    }
    let high = if high == f64::INFINITY {
        i32::MAX
    } else {
        to_i32(high)?
    };
    Ok(Some((to_i32(low)?, high)))
}
