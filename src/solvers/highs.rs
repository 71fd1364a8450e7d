//! A solver that uses [highs](https://docs.rs/highs), a parallel C++ solver.
use highs::HighsModelStatus;

use crate::constraint::Operator;
use crate::error::SolveError;
use crate::model::{Model, Sense};
use crate::solvers::{objective_columns, SolveResult, SolveStatus, Solver, SolverConfig};

/// The [highs](https://docs.rs/highs) solver
#[derive(Debug, Clone, Copy, Default)]
pub struct Highs;

impl Solver for Highs {
    fn name(&self) -> &'static str {
        "Highs"
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        let objective = model.require_objective()?;
        let mut problem = highs::RowProblem::default();
        let columns: Vec<highs::Col> = model
            .variables()
            .zip(objective_columns(model)?)
            .map(|((_, def), coeff)| {
                problem.add_column_with_integrality(coeff, def.min..def.max, def.domain.is_integer())
            })
            .collect();
        for constraint in model.constraints() {
            let bound = constraint.bound();
            let factors = constraint
                .expression
                .sorted_terms()
                .into_iter()
                .map(|(var, factor)| (columns[var.index()], factor));
            match constraint.operator {
                Operator::LessOrEqual => problem.add_row(..=bound, factors),
                Operator::GreaterOrEqual => problem.add_row(bound.., factors),
                Operator::Equal => problem.add_row(bound..=bound, factors),
            };
        }

        let mut highs_model = problem.optimise(match objective.sense {
            Sense::Maximise => highs::Sense::Maximise,
            Sense::Minimise => highs::Sense::Minimise,
        });
        highs_model.set_option(&b"output_flag"[..], config.verbose);
        if let Some(seconds) = config.time_limit {
            highs_model.set_option(&b"time_limit"[..], seconds);
        }
        if let Some(gap) = config.mip_gap {
            highs_model.set_option(&b"mip_rel_gap"[..], f64::from(gap));
        }

        let solved = highs_model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                SolveResult::optimal(model, values)
            }
            HighsModelStatus::Infeasible => {
                Ok(SolveResult::without_solution(SolveStatus::Infeasible))
            }
            HighsModelStatus::Unbounded => {
                Ok(SolveResult::without_solution(SolveStatus::Unbounded))
            }
            HighsModelStatus::NotSet => Ok(SolveResult::without_solution(SolveStatus::NotSolved)),
            HighsModelStatus::LoadError
            | HighsModelStatus::ModelError
            | HighsModelStatus::PresolveError
            | HighsModelStatus::SolveError
            | HighsModelStatus::PostsolveError => Err(SolveError::Backend {
                backend: self.name(),
                message: format!("{:?}", solved.status()),
            }),
            other => {
                tracing::warn!(backend = self.name(), status = ?other, "no proven optimum");
                Ok(SolveResult::without_solution(SolveStatus::Undefined))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Highs;
    use crate::{Domain, Model, Operator, Sense, SolveStatus, Solver, SolverConfig};

    #[test]
    fn solves_small_integer_problem() {
        let mut model = Model::new("highs");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        let y = model.create_variable("y", 0., Domain::Integer).unwrap();
        model.set_objective(3 * x + 2 * y, Sense::Maximise, "o").unwrap();
        model
            .add_constraint(x + y, Operator::LessOrEqual, 4.5, "cap")
            .unwrap();
        model.add_constraint(x, Operator::LessOrEqual, 2., "x max").unwrap();
        let result = Highs.solve(&model, &SolverConfig::default()).unwrap();
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert_eq!(result.value(x), Some(2.));
        assert_eq!(result.value(y), Some(2.));
    }
}
