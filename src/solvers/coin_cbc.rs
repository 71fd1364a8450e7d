//! A solver that uses a [Cbc](https://www.coin-or.org/Cbc/) [native library binding](https://docs.rs/coin_cbc).
//! This backend is activated using the `coin_cbc` feature.
use coin_cbc::{raw::Status, Col, Model as CbcModel, Sense as CbcSense};

use crate::constraint::Operator;
use crate::error::SolveError;
use crate::model::{Model, Sense};
use crate::solvers::{objective_columns, SolveResult, SolveStatus, Solver, SolverConfig};

/// The Cbc [COIN-OR](https://www.coin-or.org/) solver library
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinCbc;

impl CoinCbc {
    fn build(model: &Model, config: &SolverConfig) -> Result<CbcModel, SolveError> {
        let objective = model.require_objective()?;
        let mut cbc = CbcModel::default();
        let columns: Vec<Col> = model
            .variables()
            .map(|(_, def)| {
                let col = cbc.add_col();
                // Columns are created with a default min of 0
                cbc.set_col_lower(col, def.min);
                if def.max < f64::INFINITY {
                    cbc.set_col_upper(col, def.max)
                }
                if def.domain.is_integer() {
                    cbc.set_integer(col);
                }
                col
            })
            .collect();
        for (&col, coeff) in columns.iter().zip(objective_columns(model)?) {
            cbc.set_obj_coeff(col, coeff);
        }
        cbc.set_obj_sense(match objective.sense {
            Sense::Maximise => CbcSense::Maximize,
            Sense::Minimise => CbcSense::Minimize,
        });
        for constraint in model.constraints() {
            let row = cbc.add_row();
            let bound = constraint.bound();
            match constraint.operator {
                Operator::LessOrEqual => cbc.set_row_upper(row, bound),
                Operator::GreaterOrEqual => cbc.set_row_lower(row, bound),
                Operator::Equal => cbc.set_row_equal(row, bound),
            }
            for (var, coeff) in constraint.expression.sorted_terms() {
                cbc.set_weight(row, columns[var.index()], coeff);
            }
        }
        if !config.verbose {
            cbc.set_parameter("log", "0");
        }
        if let Some(seconds) = config.time_limit {
            cbc.set_parameter("sec", &(seconds.ceil() as usize).to_string());
        }
        if let Some(mip_gap) = config.mip_gap {
            cbc.set_parameter("ratiogap", &mip_gap.to_string());
        }
        Ok(cbc)
    }
}

impl Solver for CoinCbc {
    fn name(&self) -> &'static str {
        "Coin Cbc"
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        let cbc = Self::build(model, config)?;
        let solution = cbc.solve();
        let raw = solution.raw();
        match raw.status() {
            // Stopped on a limit: whatever incumbent exists is not proven optimal
            Status::Stopped | Status::Abandoned | Status::UserEvent => {
                tracing::warn!(backend = self.name(), "search interrupted before a proof of optimality");
                Ok(SolveResult::without_solution(SolveStatus::Undefined))
            }
            Status::Finished // The optimization finished, but may not have found a solution
            | Status::Unlaunched // The solver didn't have to be launched, presolve handled it
            => {
                if raw.is_continuous_unbounded() {
                    Ok(SolveResult::without_solution(SolveStatus::Unbounded))
                } else if raw.is_proven_infeasible() {
                    Ok(SolveResult::without_solution(SolveStatus::Infeasible))
                } else if raw.is_proven_optimal() {
                    SolveResult::optimal(model, raw.col_solution().to_vec())
                } else {
                    Ok(SolveResult::without_solution(SolveStatus::Undefined))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoinCbc;
    use crate::{Domain, Model, Operator, Sense, SolveStatus, Solver, SolverConfig};

    #[test]
    fn solves_small_integer_problem() {
        let mut model = Model::new("cbc");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        let y = model.create_variable("y", 0., Domain::Integer).unwrap();
        model.set_objective(3 * x + 2 * y, Sense::Maximise, "o").unwrap();
        model
            .add_constraint(x + y, Operator::LessOrEqual, 4.5, "cap")
            .unwrap();
        model.add_constraint(x, Operator::LessOrEqual, 2., "x max").unwrap();
        let result = CoinCbc.solve(&model, &SolverConfig::default()).unwrap();
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert_eq!(result.value(x), Some(2.));
        assert_eq!(result.value(y), Some(2.));
    }

    #[test]
    fn reports_infeasible() {
        let mut model = Model::new("cbc");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        model.set_objective(x, Sense::Maximise, "o").unwrap();
        model.add_constraint(x, Operator::LessOrEqual, -1., "neg").unwrap();
        let result = CoinCbc.solve(&model, &SolverConfig::default()).unwrap();
        assert_eq!(result.status(), SolveStatus::Infeasible);
    }
}
