//! Error types for model setup and simulation.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised during model setup or at the start of a run.
///
/// Setup errors are always fatal and abort before any simulation step runs;
/// nothing is recovered mid-run.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Sensor ID {id} is not unique")]
    DuplicateSensorId { id: u32 },

    #[error("Sensor ID {id} does not exist in the model")]
    UnknownSensorRef { id: u32 },

    #[error("Only {count} cells detected; at least 2 cells are required")]
    InsufficientCells { count: usize },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error(transparent)]
    Core(#[from] pf_core::PfError),
}
