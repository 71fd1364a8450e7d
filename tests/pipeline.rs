//! Driving the whole pipeline with a canned solver.
use std::cell::Cell;

use product_mix::pipeline::{run_model, run_with, Error, RunConfig};
use product_mix::{
    Model, ProductMix, SolveError, SolveResult, SolveStatus, Solver, SolverBackend, SolverConfig,
};

/// Returns a fixed outcome and counts its calls
struct Canned {
    values: Option<Vec<f64>>,
    status: SolveStatus,
    calls: Cell<usize>,
}

impl Canned {
    fn optimal(values: Vec<f64>) -> Self {
        Canned {
            values: Some(values),
            status: SolveStatus::Optimal,
            calls: Cell::new(0),
        }
    }

    fn failing(status: SolveStatus) -> Self {
        Canned {
            values: None,
            status,
            calls: Cell::new(0),
        }
    }
}

impl Solver for Canned {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn solve(&self, model: &Model, _config: &SolverConfig) -> Result<SolveResult, SolveError> {
        self.calls.set(self.calls.get() + 1);
        match &self.values {
            Some(values) => SolveResult::optimal(model, values.clone()),
            None => Ok(SolveResult::without_solution(self.status)),
        }
    }
}

fn config(file: &str) -> RunConfig {
    RunConfig {
        output: std::env::temp_dir().join(format!("{}_{}.lp", file, std::process::id())),
        ..RunConfig::default()
    }
}

#[test]
fn canned_optimum_is_reported() {
    let mix = ProductMix::standard().unwrap();
    let solver = Canned::optimal(vec![10., 9., 0., 0., 0.]);
    let config = config("pipeline_optimal");
    let mut out: Vec<u8> = vec![];
    let result = run_with(&mix.model, &solver, &config, &mut out).unwrap();
    assert_eq!(solver.calls.get(), 1);
    assert_eq!(result.objective_value(), Some(10900.));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Status: Optimal
No. of Product A = 10
No. of Product B = 9
No. of Product C = 0
No. of Product D = 0
No. of Product E = 0
"
    );
    let exported = std::fs::read_to_string(&config.output).unwrap();
    assert!(exported.contains("Grinding: 10 No._of_Product_A + 20 No._of_Product_B"));
    let _ = std::fs::remove_file(&config.output);
}

#[test]
fn infeasible_outcome_prints_none() {
    let mix = ProductMix::standard().unwrap();
    let solver = Canned::failing(SolveStatus::Infeasible);
    let config = config("pipeline_infeasible");
    let mut out: Vec<u8> = vec![];
    let result = run_with(&mix.model, &solver, &config, &mut out).unwrap();
    assert_eq!(result.status(), SolveStatus::Infeasible);
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Status: Infeasible\n"));
    assert_eq!(text.lines().filter(|l| l.ends_with(" = None")).count(), 5);
    let _ = std::fs::remove_file(&config.output);
}

#[test]
fn failed_export_skips_the_solver() {
    let mix = ProductMix::standard().unwrap();
    let solver = Canned::optimal(vec![0.; 5]);
    let config = RunConfig {
        output: std::env::temp_dir(),
        ..RunConfig::default()
    };
    let mut out: Vec<u8> = vec![];
    let err = run_with(&mix.model, &solver, &config, &mut out).unwrap_err();
    assert!(matches!(err, Error::Export(_)));
    assert!(err.to_string().starts_with("export stage: "));
    assert_eq!(solver.calls.get(), 0);
    assert!(out.is_empty());
}

#[test]
fn invalid_solver_limits_fail_the_solve_stage() {
    let mix = ProductMix::standard().unwrap();
    let solver = Canned::optimal(vec![0.; 5]);
    let mut config = config("pipeline_limits");
    config.solver = SolverConfig::default().time_limit(-1.);
    let err = run_with(&mix.model, &solver, &config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, Error::Solve(SolveError::InvalidConfig(_))));
    assert_eq!(solver.calls.get(), 0);
    let _ = std::fs::remove_file(&config.output);
}

#[test]
fn export_happens_before_backend_resolution() {
    let Some(missing) = SolverBackend::ALL.into_iter().find(|b| !b.is_compiled()) else {
        // every backend is compiled in this build
        return;
    };
    let mix = ProductMix::standard().unwrap();
    let mut config = config("pipeline_unavailable");
    config.solver = SolverConfig::with_backend(missing);
    let _ = std::fs::remove_file(&config.output);
    let mut out: Vec<u8> = vec![];
    let err = run_model(&mix.model, &config, &mut out).unwrap_err();
    assert!(matches!(err, Error::Solve(SolveError::Unavailable { .. })));
    assert!(err.to_string().starts_with("solve stage: "));
    assert!(config.output.exists());
    assert!(out.is_empty());
    let _ = std::fs::remove_file(&config.output);
}
