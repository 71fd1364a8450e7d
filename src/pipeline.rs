//! The end-to-end run: build the model, export it, solve it, report the result.
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{ExportError, ModelError, SolveError};
use crate::lp_format;
use crate::model::Model;
use crate::product_mix::ProductMix;
use crate::report::report;
use crate::solvers::{solve_with, SolveResult, Solver, SolverConfig};

/// Where the LP file is written when nothing else is configured
pub const DEFAULT_OUTPUT: &str = "product_mix_model.lp";

/// Settings of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Path of the exported LP file, overwritten on every run
    pub output: PathBuf,
    /// Backend selection and limits
    pub solver: SolverConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            output: PathBuf::from(DEFAULT_OUTPUT),
            solver: SolverConfig::default(),
        }
    }
}

/// A fatal error, tagged with the stage that produced it
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model could not be built
    #[error("build stage: {0}")]
    Build(#[from] ModelError),
    /// The model could not be exported
    #[error("export stage: {0}")]
    Export(#[from] ExportError),
    /// The solver could not run
    #[error("solve stage: {0}")]
    Solve(#[from] SolveError),
    /// The report could not be written
    #[error("report stage: {0}")]
    Report(#[source] io::Error),
}

fn build_and_export(model: &Model, config: &RunConfig) -> Result<(), Error> {
    tracing::debug!(
        model = model.name(),
        variables = model.len(),
        constraints = model.constraints().len(),
        "model built"
    );
    lp_format::export(model, &config.output)?;
    Ok(())
}

fn solve_and_report<W: Write>(
    model: &Model,
    solver: &dyn Solver,
    config: &RunConfig,
    out: &mut W,
) -> Result<SolveResult, Error> {
    let result = solve_with(solver, model, &config.solver)?;
    report(model, &result, out).map_err(Error::Report)?;
    Ok(result)
}

/// Export, solve and report an already built model with the given solver.
/// Nothing is solved when the export fails.
pub fn run_with<W: Write>(
    model: &Model,
    solver: &dyn Solver,
    config: &RunConfig,
    out: &mut W,
) -> Result<SolveResult, Error> {
    build_and_export(model, config)?;
    solve_and_report(model, solver, config, out)
}

/// Export the model, then solve it with the configured backend and report.
/// The LP file is written even when the backend turns out to be unavailable.
pub fn run_model<W: Write>(
    model: &Model,
    config: &RunConfig,
    out: &mut W,
) -> Result<SolveResult, Error> {
    build_and_export(model, config)?;
    let solver = config.solver.backend.solver()?;
    solve_and_report(model, solver.as_ref(), config, out)
}

/// Build the standard product mix, then [run_model]
pub fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<SolveResult, Error> {
    let mix = ProductMix::standard()?;
    run_model(&mix.model, config, out)
}
