//! The solver capability and its backends.
//!
//! A [Solver] turns a [Model] into a [SolveResult]. Backends are selected by
//! name through [SolverBackend]; the ones that link native libraries or call
//! external binaries are behind cargo features.
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

use crate::error::{ModelError, SolveError};
use crate::expression::LinearExpression;
use crate::model::Model;
use crate::variable::Variable;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;
#[cfg(feature = "highs")]
pub mod highs;
#[cfg(feature = "lp-solvers")]
pub mod lp_solvers;
#[cfg(feature = "microlp")]
pub mod microlp;

/// Distance under which the value of an integer variable is rounded to the nearest integer
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// The outcome of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// The solver proved that no better objective value exists
    Optimal,
    /// There exists no solution that satisfies all of the constraints
    Infeasible,
    /// The objective can be made infinitely good without violating any constraints
    Unbounded,
    /// The solver stopped without proving anything
    Undefined,
    /// The solver did not run
    NotSolved,
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::Undefined => "Undefined",
            SolveStatus::NotSolved => "Not Solved",
        })
    }
}

/// A problem solution
pub trait Solution {
    /// Get the value of a variable of the problem
    fn value(&self, variable: Variable) -> f64;

    /// Evaluate an expression with the values of this solution
    fn eval(&self, expr: &LinearExpression) -> f64
    where
        Self: Sized,
    {
        expr.eval_with(self)
    }
}

impl<N: Into<f64> + Clone> Solution for HashMap<Variable, N> {
    fn value(&self, variable: Variable) -> f64 {
        self[&variable].clone().into()
    }
}

/// The value of every variable of a model, in creation order
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// The values, in variable creation order
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Solution for Assignment {
    fn value(&self, variable: Variable) -> f64 {
        self.values[variable.index()]
    }
}

/// What a solver returns: a status, and variable values when the status is [SolveStatus::Optimal]
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    status: SolveStatus,
    assignment: Option<Assignment>,
    objective_value: Option<f64>,
}

impl SolveResult {
    /// An optimal result. `values` holds one value per model variable, in creation order.
    /// Values of integer variables close to an integer are rounded to it.
    pub fn optimal(model: &Model, mut values: Vec<f64>) -> Result<Self, SolveError> {
        if values.len() != model.len() {
            return Err(SolveError::ValueCount {
                expected: model.len(),
                got: values.len(),
            });
        }
        for ((_, def), value) in model.variables().zip(values.iter_mut()) {
            let rounded = value.round();
            if def.domain.is_integer() && (*value - rounded).abs() <= INTEGRALITY_TOLERANCE {
                *value = rounded;
            }
        }
        let assignment = Assignment { values };
        let objective_value = model
            .objective()
            .map(|objective| objective.expression.eval_with(&assignment));
        Ok(SolveResult {
            status: SolveStatus::Optimal,
            assignment: Some(assignment),
            objective_value,
        })
    }

    /// A result that carries no values.
    /// Passing [SolveStatus::Optimal] here yields [SolveStatus::Undefined]:
    /// an optimum without values is not a proof of anything.
    pub fn without_solution(status: SolveStatus) -> Self {
        let status = match status {
            SolveStatus::Optimal => SolveStatus::Undefined,
            other => other,
        };
        SolveResult {
            status,
            assignment: None,
            objective_value: None,
        }
    }

    /// The solve status
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// The value of a variable, only when the status is optimal
    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.assignment
            .as_ref()
            .and_then(|a| a.values.get(variable.index()).copied())
    }

    /// All the variable values, only when the status is optimal
    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// The objective value of the assignment, only when the status is optimal
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }
}

/// Options handed to the backend
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolverConfig {
    /// Which backend to run
    pub backend: SolverBackend,
    /// Maximum solve time in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the search may stop
    pub mip_gap: Option<f32>,
    /// Let the backend print its own logs
    pub verbose: bool,
}

impl SolverConfig {
    /// A default configuration for the given backend
    pub fn with_backend(backend: SolverBackend) -> Self {
        SolverConfig {
            backend,
            ..Default::default()
        }
    }

    /// Set the time limit, in seconds
    pub fn time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap
    pub fn mip_gap(mut self, gap: f32) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Check that the limits are usable numbers
    pub fn validate(&self) -> Result<(), SolveError> {
        if let Some(seconds) = self.time_limit {
            if !seconds.is_finite() || seconds < 0. {
                return Err(SolveError::InvalidConfig(format!(
                    "time limit must be a non-negative number of seconds, got {}",
                    seconds
                )));
            }
        }
        if let Some(gap) = self.mip_gap {
            if gap.is_sign_negative() || !gap.is_finite() {
                return Err(SolveError::InvalidConfig(format!(
                    "MIP gap must be finite and non-negative, got {}",
                    gap
                )));
            }
        }
        Ok(())
    }
}

/// The solver backends this crate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolverBackend {
    /// [microlp](https://docs.rs/microlp), a pure rust solver
    #[default]
    MicroLp,
    /// The Cbc [COIN-OR](https://www.coin-or.org/) solver library
    CoinCbc,
    /// The [HiGHS](https://highs.dev) solver library
    Highs,
    /// The `cbc` binary, run as an external process
    CbcCommand,
    /// The `glpsol` binary, run as an external process
    GlpkCommand,
}

impl SolverBackend {
    /// Every known backend, compiled in or not
    pub const ALL: [SolverBackend; 5] = [
        SolverBackend::MicroLp,
        SolverBackend::CoinCbc,
        SolverBackend::Highs,
        SolverBackend::CbcCommand,
        SolverBackend::GlpkCommand,
    ];

    /// The identifier accepted by [FromStr]
    pub fn id(self) -> &'static str {
        match self {
            SolverBackend::MicroLp => "microlp",
            SolverBackend::CoinCbc => "cbc",
            SolverBackend::Highs => "highs",
            SolverBackend::CbcCommand => "cbc-cmd",
            SolverBackend::GlpkCommand => "glpk-cmd",
        }
    }

    fn feature(self) -> &'static str {
        match self {
            SolverBackend::MicroLp => "microlp",
            SolverBackend::CoinCbc => "coin_cbc",
            SolverBackend::Highs => "highs",
            SolverBackend::CbcCommand | SolverBackend::GlpkCommand => "lp-solvers",
        }
    }

    fn unavailable(self) -> SolveError {
        SolveError::Unavailable {
            backend: self.id().to_string(),
            reason: format!("built without the `{}` feature", self.feature()),
        }
    }

    /// Instantiate the backend.
    /// Fails with [SolveError::Unavailable] when it was not compiled in.
    pub fn solver(self) -> Result<Box<dyn Solver>, SolveError> {
        match self {
            #[cfg(feature = "microlp")]
            SolverBackend::MicroLp => Ok(Box::new(microlp::MicroLp)),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Box::new(coin_cbc::CoinCbc)),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Box::new(highs::Highs)),
            #[cfg(feature = "lp-solvers")]
            SolverBackend::CbcCommand => Ok(Box::new(lp_solvers::ExternalSolver::cbc())),
            #[cfg(feature = "lp-solvers")]
            SolverBackend::GlpkCommand => Ok(Box::new(lp_solvers::ExternalSolver::glpk())),
            #[allow(unreachable_patterns)]
            other => Err(other.unavailable()),
        }
    }

    /// Whether [SolverBackend::solver] can succeed in this build
    pub fn is_compiled(self) -> bool {
        match self {
            SolverBackend::MicroLp => cfg!(feature = "microlp"),
            SolverBackend::CoinCbc => cfg!(feature = "coin_cbc"),
            SolverBackend::Highs => cfg!(feature = "highs"),
            SolverBackend::CbcCommand | SolverBackend::GlpkCommand => {
                cfg!(feature = "lp-solvers")
            }
        }
    }
}

impl Display for SolverBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// ```
/// # use product_mix::SolverBackend;
/// assert_eq!("PULP_CBC_CMD".parse::<SolverBackend>().unwrap(), SolverBackend::CbcCommand);
/// assert!("gurobi".parse::<SolverBackend>().is_err());
/// ```
impl FromStr for SolverBackend {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "microlp" | "default" => Ok(SolverBackend::MicroLp),
            "cbc" | "coin-cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            "cbc-cmd" | "pulp-cbc-cmd" => Ok(SolverBackend::CbcCommand),
            "glpk-cmd" | "glpsol" => Ok(SolverBackend::GlpkCommand),
            _ => Err(SolveError::Unavailable {
                backend: s.to_string(),
                reason: format!(
                    "unknown backend (known: {})",
                    SolverBackend::ALL.map(SolverBackend::id).join(", ")
                ),
            }),
        }
    }
}

/// A solver backend.
pub trait Solver {
    /// A human-readable name of the backend
    fn name(&self) -> &'static str;

    /// Find the optimal assignment of the model variables.
    /// Infeasible or unbounded models are reported through the status, not as errors.
    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError>;
}

/// Solve the model with the backend selected by the configuration.
/// There is no fallback: an unavailable backend is an error.
///
/// ```
/// # #[cfg(feature = "microlp")] {
/// use product_mix::{solve, Domain, Model, Operator, Sense, SolveStatus, SolverConfig};
/// let mut model = Model::new("small");
/// let x = model.create_variable("x", 0., Domain::Integer)?;
/// model.set_objective(x, Sense::Maximise, "x")?;
/// model.add_constraint(2 * x, Operator::LessOrEqual, 7., "cap")?;
/// let result = solve(&model, &SolverConfig::default())?;
/// assert_eq!(result.status(), SolveStatus::Optimal);
/// assert_eq!(result.value(x), Some(3.));
/// # }
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError> {
    let solver = config.backend.solver()?;
    solve_with(solver.as_ref(), model, config)
}

/// Solve the model with a given solver instance, logging the outcome
pub fn solve_with(
    solver: &dyn Solver,
    model: &Model,
    config: &SolverConfig,
) -> Result<SolveResult, SolveError> {
    config.validate()?;
    model.require_objective()?;
    let start = Instant::now();
    let result = solver.solve(model, config)?;
    tracing::info!(
        backend = solver.name(),
        status = %result.status(),
        objective = ?result.objective_value(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.,
        "solve finished"
    );
    Ok(result)
}

/// The objective coefficient of each variable, in creation order
pub(crate) fn objective_columns(model: &Model) -> Result<Vec<f64>, ModelError> {
    let objective = model.require_objective()?;
    Ok(model
        .variables()
        .map(|(var, _)| objective.expression.coefficient(var))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Sense};

    #[test]
    fn optimal_result_rounds_integer_values() {
        let mut model = Model::new("t");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        let y = model.create_variable("y", 0., Domain::Continuous).unwrap();
        model.set_objective(2 * x + y, Sense::Maximise, "o").unwrap();
        let result = SolveResult::optimal(&model, vec![2.9999999, 0.5]).unwrap();
        assert_eq!(result.value(x), Some(3.));
        assert_eq!(result.value(y), Some(0.5));
        assert_eq!(result.objective_value(), Some(6.5));
    }

    #[test]
    fn non_optimal_results_have_no_values() {
        let mut model = Model::new("t");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        let result = SolveResult::without_solution(SolveStatus::Infeasible);
        assert_eq!(result.value(x), None);
        assert!(result.assignment().is_none());
        assert_eq!(
            SolveResult::without_solution(SolveStatus::Optimal).status(),
            SolveStatus::Undefined
        );
    }

    #[test]
    fn backend_names_round_trip() {
        for backend in SolverBackend::ALL {
            assert_eq!(backend.id().parse::<SolverBackend>().unwrap(), backend);
        }
        assert_eq!(
            "COIN_CBC".parse::<SolverBackend>().unwrap(),
            SolverBackend::CoinCbc
        );
    }

    #[test]
    fn unknown_backend_is_unavailable() {
        let err = "cplex".parse::<SolverBackend>().unwrap_err();
        assert!(matches!(err, SolveError::Unavailable { ref backend, .. } if backend == "cplex"));
    }

    #[test]
    fn uncompiled_backend_is_unavailable() {
        for backend in SolverBackend::ALL {
            let instance = backend.solver();
            assert_eq!(instance.is_ok(), backend.is_compiled(), "{}", backend);
            if let Err(err) = instance {
                assert!(matches!(err, SolveError::Unavailable { .. }));
            }
        }
    }

    #[test]
    fn rejects_bad_limits() {
        assert!(SolverConfig::default().time_limit(-1.).validate().is_err());
        assert!(SolverConfig::default().time_limit(f64::NAN).validate().is_err());
        assert!(SolverConfig::default().mip_gap(f32::INFINITY).validate().is_err());
        assert!(SolverConfig::default().time_limit(5.).mip_gap(0.01).validate().is_ok());
    }
}
