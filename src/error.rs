//! Errors raised while building, exporting, reading and solving a model.
//!
//! Outcomes such as an infeasible or unbounded problem are not errors:
//! they are reported through [SolveStatus](crate::SolveStatus).
use std::io;
use std::path::PathBuf;

/// A structural error in the model. These are programming errors and
/// abort the pipeline before anything is exported or solved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A variable bound is not usable (not finite, NaN, or lower > upper)
    #[error("variable '{name}' has an invalid bound: {reason}")]
    InvalidBound {
        /// Name of the offending variable
        name: String,
        /// What is wrong with the bound
        reason: String,
    },
    /// The domain string could not be recognized
    #[error("unrecognized variable domain '{0}' (expected continuous, integer or binary)")]
    InvalidDomain(String),
    /// Two variables of the same model share a name
    #[error("a variable named '{0}' already exists in this model")]
    DuplicateVariable(String),
    /// A coefficient, constant or right hand side is NaN or infinite
    #[error("{context} has a non-finite coefficient ({value})")]
    InvalidCoefficient {
        /// The objective or constraint containing the coefficient
        context: String,
        /// The rejected value
        value: f64,
    },
    /// `set_objective` was called on a model that already has one
    #[error("the objective is already set to '{0}'")]
    ObjectiveAlreadySet(String),
    /// An expression uses a variable that belongs to another model
    #[error("{context} references a variable that is not registered in this model")]
    UnknownVariable {
        /// The objective or constraint containing the variable
        context: String,
    },
    /// The model was exported or solved before an objective was set
    #[error("the model has no objective")]
    MissingObjective,
}

/// Failure to export a model to the LP format
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The target file could not be written
    #[error("cannot write LP file '{}': {source}", path.display())]
    Write {
        /// The target path
        path: PathBuf,
        /// The underlying io error
        #[source]
        source: io::Error,
    },
    /// The model cannot be expressed as an LP file
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure to read a model back from the LP format
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The source file could not be read
    #[error("cannot read LP file '{}': {source}", path.display())]
    Io {
        /// The source path
        path: PathBuf,
        /// The underlying io error
        #[source]
        source: io::Error,
    },
    /// The text does not follow the LP grammar
    #[error("LP syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },
    /// The text is well formed, but describes an invalid model
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure to solve a model. A solver that runs and reports an infeasible
/// problem does not produce this error.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The requested backend is unknown, not compiled in, or cannot be started
    #[error("solver backend '{backend}' is unavailable: {reason}")]
    Unavailable {
        /// The backend identifier that was requested
        backend: String,
        /// Why it cannot be used
        reason: String,
    },
    /// A solver option is out of range
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
    /// The model cannot be handed to a solver
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A backend returned a number of values that does not match the model
    #[error("solver returned {got} values for a model with {expected} variables")]
    ValueCount {
        /// Number of variables in the model
        expected: usize,
        /// Number of values returned
        got: usize,
    },
    /// The backend failed in a way that does not map to a solve status
    #[error("solver backend '{backend}' failed: {message}")]
    Backend {
        /// The backend name
        backend: &'static str,
        /// The backend's own message
        message: String,
    },
}
