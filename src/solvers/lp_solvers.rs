//! This module solves models with external solver binaries (`cbc`, `glpsol`),
//! through the [lp-solvers](https://docs.rs/lp-solvers) crate.
//! Contrarily to the other backends, this one doesn't require linking your program to any solver.
//! A solver binary will need to be present on the user's computer at runtime.
use std::cmp::Ordering;

use lp_solvers::lp_format::{Constraint as LpConstraint, LpObjective};
use lp_solvers::problem::{Problem, StrExpression, Variable as LpVariable};
use lp_solvers::solvers::{CbcSolver, GlpkSolver, SolverTrait, Status, WithMaxSeconds, WithMipGap};

use crate::constraint::Operator;
use crate::error::SolveError;
use crate::expression::LinearExpression;
use crate::lp_format::LpNames;
use crate::model::{Model, Sense};
use crate::solvers::{SolveResult, SolveStatus, Solver, SolverConfig};

/// Applies the solver limits a given binary understands
pub trait ApplyLimits: Sized {
    /// Return the solver configured with the limits of `config`
    fn apply_limits(self, config: &SolverConfig) -> Result<Self, SolveError>;
}

impl ApplyLimits for CbcSolver {
    fn apply_limits(self, config: &SolverConfig) -> Result<Self, SolveError> {
        let mut solver = self;
        if let Some(seconds) = config.time_limit {
            solver = solver.with_max_seconds(seconds.ceil() as u32);
        }
        if let Some(gap) = config.mip_gap {
            solver = solver
                .with_mip_gap(gap)
                .map_err(SolveError::InvalidConfig)?;
        }
        Ok(solver)
    }
}

impl ApplyLimits for GlpkSolver {
    fn apply_limits(self, config: &SolverConfig) -> Result<Self, SolveError> {
        if config.time_limit.is_some() || config.mip_gap.is_some() {
            tracing::warn!(backend = "glpsol", "time limit and MIP gap are ignored");
        }
        Ok(self)
    }
}

/// A solver binary, run as a subprocess on a temporary LP file
#[derive(Debug, Clone)]
pub struct ExternalSolver<T> {
    solver: T,
    name: &'static str,
}

impl ExternalSolver<CbcSolver> {
    /// The `cbc` binary
    pub fn cbc() -> Self {
        ExternalSolver {
            solver: CbcSolver::new(),
            name: "cbc (external)",
        }
    }
}

impl ExternalSolver<GlpkSolver> {
    /// The `glpsol` binary
    pub fn glpk() -> Self {
        ExternalSolver {
            solver: GlpkSolver::new(),
            name: "glpsol (external)",
        }
    }
}

fn str_expression(expr: &LinearExpression, names: &LpNames) -> StrExpression {
    StrExpression(
        expr.sorted_terms()
            .into_iter()
            .map(|(var, coeff)| format!("{:+} {}", coeff, names.variables[var.index()]))
            .collect::<Vec<String>>()
            .join(" "),
    )
}

/// Translate the model to an lp-solvers problem, using the same names as the LP export
fn to_problem(model: &Model) -> Result<Problem, SolveError> {
    let objective = model.require_objective()?;
    let names = LpNames::new(model);
    let variables = model
        .variables()
        .zip(&names.variables)
        .map(|((_, def), name)| LpVariable {
            name: name.clone(),
            is_integer: def.domain.is_integer(),
            lower_bound: def.min,
            upper_bound: def.max,
        })
        .collect();
    let constraints = model
        .constraints()
        .iter()
        .map(|constraint| LpConstraint {
            lhs: str_expression(&constraint.expression, &names),
            operator: match constraint.operator {
                Operator::LessOrEqual => Ordering::Less,
                Operator::GreaterOrEqual => Ordering::Greater,
                Operator::Equal => Ordering::Equal,
            },
            rhs: constraint.bound(),
        })
        .collect();
    Ok(Problem {
        name: names.objective.clone(),
        sense: match objective.sense {
            Sense::Maximise => LpObjective::Maximize,
            Sense::Minimise => LpObjective::Minimize,
        },
        objective: str_expression(&objective.expression, &names),
        variables,
        constraints,
    })
}

impl<T> Solver for ExternalSolver<T>
where
    T: SolverTrait + ApplyLimits + Clone,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        let problem = to_problem(model)?;
        let solver = self.solver.clone().apply_limits(config)?;
        let solution = solver
            .run(&problem)
            .map_err(|reason| SolveError::Unavailable {
                backend: config.backend.id().to_string(),
                reason,
            })?;
        match solution.status {
            Status::Optimal => {
                let values = problem
                    .variables
                    .iter()
                    .map(|v| f64::from(*solution.results.get(&v.name).unwrap_or(&0.)))
                    .collect();
                SolveResult::optimal(model, values)
            }
            Status::Infeasible => Ok(SolveResult::without_solution(SolveStatus::Infeasible)),
            Status::Unbounded => Ok(SolveResult::without_solution(SolveStatus::Unbounded)),
            Status::NotSolved => Ok(SolveResult::without_solution(SolveStatus::NotSolved)),
            #[allow(unreachable_patterns)]
            _ => {
                tracing::warn!(backend = self.name, "no proven optimum");
                Ok(SolveResult::without_solution(SolveStatus::Undefined))
            }
        }
    }
}
