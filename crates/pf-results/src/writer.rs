//! Flat-file result writers.
//!
//! File shapes follow the established downstream tooling:
//! - `ss_results.txt`: one line per sensor in addition order,
//!   `mean_temp std_temp mean_xflux std_xflux mean_yflux std_yflux`
//! - `per_results.txt`: a t=0 block (initial temperatures, zero flux),
//!   then one block per 20-step window headed by the integer mid-step index
//!   and the sensor count.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::stats::mean_and_stderr;
use crate::{ResultsError, ResultsResult};
use pf_sim::SensorMeasurements;

const PERIODIC_INTERVAL: usize = 20;
const STEADY_STATE_FRACTION: f64 = 0.1;

/// Write both result files into `dir`.
pub fn export_results(
    dir: &Path,
    measurements: &[SensorMeasurements],
    num_steps: usize,
) -> ResultsResult<()> {
    check_series(measurements, num_steps)?;
    fs::create_dir_all(dir)?;
    export_steady_state(dir, measurements, num_steps)?;
    export_periodic(dir, measurements, num_steps)?;
    Ok(())
}

fn check_series(measurements: &[SensorMeasurements], num_steps: usize) -> ResultsResult<()> {
    for m in measurements {
        for series in [&m.temperatures_k, &m.x_fluxes, &m.y_fluxes] {
            if series.len() != num_steps {
                return Err(ResultsError::SeriesLength {
                    sensor_id: m.sensor_id,
                    expected: num_steps,
                    got: series.len(),
                });
            }
        }
    }
    Ok(())
}

/// Steady-state summary over the trailing 10% of steps (at least one).
pub fn export_steady_state(
    dir: &Path,
    measurements: &[SensorMeasurements],
    num_steps: usize,
) -> ResultsResult<()> {
    let ss_steps = ((num_steps as f64 * STEADY_STATE_FRACTION) as usize).max(1);
    let mut out = String::new();
    for m in measurements {
        let start = m.temperatures_k.len().saturating_sub(ss_steps);
        let (mean_t, std_t) = mean_and_stderr(&m.temperatures_k[start..]);
        let (mean_xf, std_xf) = mean_and_stderr(&m.x_fluxes[start..]);
        let (mean_yf, std_yf) = mean_and_stderr(&m.y_fluxes[start..]);
        let _ = writeln!(out, "{mean_t} {std_t} {mean_xf} {std_xf} {mean_yf} {std_yf}");
    }
    fs::write(dir.join("ss_results.txt"), out)?;
    Ok(())
}

/// Periodic time series averaged over 20-step windows.
///
/// The first block is the t=0 initial condition with zero flux; windows then
/// start at step index 1, and the final window is truncated at `num_steps`.
pub fn export_periodic(
    dir: &Path,
    measurements: &[SensorMeasurements],
    num_steps: usize,
) -> ResultsResult<()> {
    let mut out = String::new();
    let num_sensors = measurements.len();

    let _ = writeln!(out, "0\n{num_sensors}");
    for m in measurements {
        let _ = writeln!(out, "{} {} {}", m.init_temp_k, 0, 0);
    }

    let mut i = 1;
    while i < num_steps {
        let end = (i + PERIODIC_INTERVAL).min(num_steps);
        let _ = writeln!(out, "{}\n{num_sensors}", (i + PERIODIC_INTERVAL) / 2);
        for m in measurements {
            let temp = window_mean(&m.temperatures_k[i..end]);
            let xf = window_mean(&m.x_fluxes[i..end]);
            let yf = window_mean(&m.y_fluxes[i..end]);
            let _ = writeln!(out, "{temp} {xf} {yf}");
        }
        i += PERIODIC_INTERVAL;
    }

    fs::write(dir.join("per_results.txt"), out)?;
    Ok(())
}

fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}
