use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use product_mix::pipeline::{self, RunConfig, DEFAULT_OUTPUT};
use product_mix::{SolverBackend, SolverConfig};

/// Environment variable holding the log filter, in `EnvFilter` syntax
const LOG_ENV: &str = "PRODUCT_MIX_LOG";

#[derive(Parser)]
#[command(name = "product-mix")]
#[command(about = "Build, export and solve the product mix problem", long_about = None)]
struct Cli {
    /// Solver backend (microlp, cbc, highs, cbc-cmd, glpk-cmd)
    #[arg(short, long, default_value = "microlp")]
    solver: String,
    /// Where to write the LP file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Maximum solve time, in seconds
    #[arg(long)]
    time_limit: Option<f64>,
    /// Relative MIP gap at which the search may stop
    #[arg(long)]
    mip_gap: Option<f32>,
    /// Print the backend's own solver logs
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging() -> Result<(), String> {
    let filter = match env::var(LOG_ENV) {
        Ok(value) => EnvFilter::try_new(&value)
            .map_err(|err| format!("invalid {} filter: {}", LOG_ENV, err))?,
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| format!("failed to initialize logging: {}", err))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;
    let backend: SolverBackend = cli.solver.parse().map_err(pipeline::Error::Solve)?;
    let config = RunConfig {
        output: cli.output,
        solver: SolverConfig {
            backend,
            time_limit: cli.time_limit,
            mip_gap: cli.mip_gap,
            verbose: cli.verbose,
        },
    };
    let stdout = io::stdout();
    pipeline::run(&config, &mut stdout.lock())?;
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
