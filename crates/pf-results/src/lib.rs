//! pf-results: flat-file export of sensor measurement histories.
//!
//! Two files per run:
//! - `ss_results.txt`: steady-state summary over the trailing 10% of steps
//! - `per_results.txt`: periodic time series averaged over 20-step windows

pub mod stats;
pub mod writer;

pub use stats::mean_and_stderr;
pub use writer::{export_periodic, export_results, export_steady_state};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Series length mismatch for sensor {sensor_id}: expected {expected}, got {got}")]
    SeriesLength {
        sensor_id: u32,
        expected: usize,
        got: usize,
    },
}
