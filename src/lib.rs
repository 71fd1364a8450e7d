//! Build, export and solve product-mix linear programs.
//!
//! A [Model] holds typed decision variables, one linear objective and linear
//! constraints. It can be written to a CPLEX LP file with [export], and solved
//! by any backend implementing [Solver]. The outcome is a [SolveResult] that
//! [report] prints as a status line followed by one line per variable.
//!
//! ```rust
//! # #[cfg(feature = "microlp")] {
//! use product_mix::{solve, ProductMix, SolveStatus, SolverConfig};
//!
//! let mix = ProductMix::standard()?;
//! let result = solve(&mix.model, &SolverConfig::default())?;
//! assert_eq!(result.status(), SolveStatus::Optimal);
//! assert_eq!(result.objective_value(), Some(10900.));
//! # }
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

pub use constraint::{Constraint, Operator};
pub use error::{ExportError, ModelError, ReadError, SolveError};
pub use expression::LinearExpression;
pub use lp_format::{export, parse_lp, read_lp, to_lp_string, write_lp, LpNames};
pub use model::{Model, Objective, Sense};
pub use product_mix::{Product, ProductMix, Resource};
pub use report::{print_report, report};
pub use solvers::{
    solve, solve_with, Assignment, Solution, SolveResult, SolveStatus, Solver, SolverBackend,
    SolverConfig,
};
pub use variable::{Domain, Variable, VariableDefinition};

mod constraint;
mod error;
mod expression;
pub mod lp_format;
mod model;
pub mod pipeline;
pub mod product_mix;
mod report;
pub mod solvers;
mod variable;
