//! Time-stepping engine: the per-step phase pipeline.
//!
//! Per step, phases run in this exact order across all cells:
//! emission → drift → merge → scatter → measurement. The ordering is
//! load-bearing: merge must follow drift so transmitted phonons never drift
//! or scatter twice in one step, and scatter reads the sensor temperature
//! written by the previous step's measurement.

use core::f64::consts::TAU;

use rand::Rng;
use tracing::trace;

use crate::cell::Cell;
use crate::error::{ModelError, ModelResult};
use crate::phonon::{Direction, Phonon, Point};
use crate::sensor::Sensor;
use crate::surface::{Crossing, SurfaceLocation};
use pf_material::{Material, SpectralTable};

/// Options for a simulation run.
#[derive(Clone, Copy, Debug)]
pub struct SimOptions {
    /// Fixed physical time step (seconds)
    pub time_step_s: f64,
    /// Target number of simulated phonons; the effective energy quantum is
    /// total energy divided by this count.
    pub target_phonons: u64,
    /// Seed for the run's generator; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            time_step_s: 5.0e-12,
            target_phonons: 10_000_000,
            seed: None,
        }
    }
}

/// Progress snapshot reported once per completed step.
#[derive(Clone, Copy, Debug)]
pub struct StepProgress {
    pub step: usize,
    pub num_steps: usize,
    /// Resident phonons across all cells.
    pub phonon_count: usize,
    pub fraction_complete: f64,
}

/// Fixed inputs of one run, derived by the model during setup.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunParams {
    pub(crate) t_eq_k: f64,
    pub(crate) eff_energy_j: f64,
    /// c_v(T_eq), used by the measurement temperature inversion.
    pub(crate) heat_capacity: f64,
    pub(crate) time_step_s: f64,
    pub(crate) num_steps: usize,
}

/// Drive the phase pipeline for the configured number of steps.
pub(crate) fn run_steps<R: Rng>(
    cells: &mut [Cell],
    sensors: &mut [Sensor],
    material: &Material,
    params: &RunParams,
    rng: &mut R,
    mut progress: Option<&mut dyn FnMut(&StepProgress)>,
) -> ModelResult<()> {
    add_initial_phonons(cells, material, rng)?;
    report(&mut progress, cells, 0, params.num_steps);

    for step in 1..=params.num_steps {
        emit_phonons(cells, material, params, rng)?;
        drift_phonons(cells, params.time_step_s)?;
        merge_phonons(cells);
        scatter_phonons(cells, sensors, material, params.time_step_s, rng)?;
        take_measurements(cells, sensors, params);

        trace!(step, phonons = population(cells), "step complete");
        report(&mut progress, cells, step, params.num_steps);
    }
    Ok(())
}

fn population(cells: &[Cell]) -> usize {
    cells.iter().map(Cell::phonon_count).sum()
}

fn report(
    progress: &mut Option<&mut dyn FnMut(&StepProgress)>,
    cells: &[Cell],
    step: usize,
    num_steps: usize,
) {
    if let Some(cb) = progress.as_mut() {
        (*cb)(&StepProgress {
            step,
            num_steps,
            phonon_count: population(cells),
            fraction_complete: step as f64 / num_steps as f64,
        });
    }
}

/// Draw the phonon's spectral state from a sampling table.
fn assign_spectral_state<R: Rng>(
    phonon: &mut Phonon,
    material: &Material,
    table: &SpectralTable,
    rng: &mut R,
) -> ModelResult<()> {
    let (bin, polarization) = table
        .sample(rng.r#gen::<f64>())
        .ok_or(ModelError::Invariant {
            what: "sampled from an empty spectral table",
        })?;
    phonon.update_properties(
        material.frequency(bin, polarization),
        material.velocity(bin, polarization),
        polarization,
    );
    Ok(())
}

/// Seed every cell with its initial deviational population.
fn add_initial_phonons<R: Rng>(
    cells: &mut [Cell],
    material: &Material,
    rng: &mut R,
) -> ModelResult<()> {
    for cell in cells.iter_mut() {
        let count = cell.init_phonons;
        if count == 0 {
            continue;
        }
        let sign = cell.init_sign;
        let mut newborns = Vec::with_capacity(count);
        for _ in 0..count {
            let mut p = Phonon::new(sign);
            p.set_random_direction(rng.r#gen(), rng.r#gen());
            p.position = cell.random_interior_point(rng.r#gen(), rng.r#gen());
            assign_spectral_state(&mut p, material, &cell.base_table, rng)?;
            newborns.push(p);
        }
        cell.extend_phonons(newborns);
    }
    Ok(())
}

/// Boundary emission from every emit surface, following its schedule.
///
/// Directions are cosine-law biased off the boundary normal; each newborn
/// receives a uniformly sampled fraction of the step as its drift budget.
fn emit_phonons<R: Rng>(
    cells: &mut [Cell],
    material: &Material,
    params: &RunParams,
    rng: &mut R,
) -> ModelResult<()> {
    for cell in cells.iter_mut() {
        let mut newborns = Vec::new();
        for schedule in &cell.emit_schedules {
            let whole = schedule.phonons_per_step.floor();
            let mut count = whole as usize;
            if rng.r#gen::<f64>() < schedule.phonons_per_step - whole {
                count += 1;
            }
            let sign = if schedule.temp_k > params.t_eq_k { 1 } else { -1 };

            for _ in 0..count {
                let mut p = Phonon::new(sign);
                let r1 = rng.r#gen::<f64>();
                let biased = r1.sqrt();
                let other = (1.0 - r1).sqrt() * (TAU * rng.r#gen::<f64>()).cos();
                match schedule.location {
                    SurfaceLocation::Left => {
                        p.position = Point {
                            x: 0.0,
                            y: cell.width_m() * rng.r#gen::<f64>(),
                        };
                        p.direction = Direction::new(biased, other);
                    }
                    SurfaceLocation::Right => {
                        p.position = Point {
                            x: cell.length_m(),
                            y: cell.width_m() * rng.r#gen::<f64>(),
                        };
                        p.direction = Direction::new(-biased, other);
                    }
                }
                p.drift_time_s = params.time_step_s * rng.r#gen::<f64>();
                assign_spectral_state(&mut p, material, &schedule.table, rng)?;
                newborns.push(p);
            }
        }
        cell.extend_phonons(newborns);
    }
    Ok(())
}

/// Advance every resident phonon through its drift budget, resolving
/// boundary crossings until the budget is spent or the phonon is absorbed.
///
/// Phonons that left their origin cell or went inactive are removed from the
/// origin's resident list via swap-with-last; transmitted phonons land in
/// their final cell's inbound buffer for the merge phase.
fn drift_phonons(cells: &mut [Cell], time_step_s: f64) -> ModelResult<()> {
    for ci in 0..cells.len() {
        let mut residents = cells[ci].take_phonons();
        let mut i = residents.len();
        while i > 0 {
            i -= 1;
            let p = &mut residents[i];
            // survivors of the previous step get a full budget; newly emitted
            // phonons keep their partial one
            if p.drift_time_s <= 0.0 {
                p.drift_time_s = time_step_s;
            }
            let mut cur = ci;
            loop {
                let Some(location) = cells[cur].move_to_nearest_surface(p) else {
                    break;
                };
                let surface = *cells[cur]
                    .surface(location)
                    .ok_or(ModelError::Invariant {
                        what: "phonon reached an unwired cell boundary",
                    })?;
                match surface.on_phonon_arrival(p) {
                    Crossing::Absorbed => break,
                    Crossing::Transmitted { to } => {
                        cur = to.index() as usize;
                        // enter the neighbor at its matching boundary
                        p.position.x = match location {
                            SurfaceLocation::Left => cells[cur].length_m(),
                            SurfaceLocation::Right => 0.0,
                        };
                    }
                    Crossing::Reflected => {}
                }
                if p.drift_time_s <= 0.0 {
                    break;
                }
            }
            if cur != ci || !p.active {
                let p = residents.swap_remove(i);
                if p.active {
                    cells[cur].add_incoming(p);
                }
            }
        }
        cells[ci].restore_phonons(residents);
    }
    Ok(())
}

fn merge_phonons(cells: &mut [Cell]) {
    for cell in cells.iter_mut() {
        cell.merge_incoming();
    }
}

/// Stochastic scattering at the cell's current sensor temperature.
///
/// One acceptance draw per phonon against 1 − exp(−Δt/τ); on acceptance one
/// partition draw selects the channel by cumulative rate. Normal and Umklapp
/// re-sample the spectral state (Umklapp additionally randomizes direction);
/// impurity scattering randomizes direction only.
fn scatter_phonons<R: Rng>(
    cells: &mut [Cell],
    sensors: &[Sensor],
    material: &Material,
    time_step_s: f64,
    rng: &mut R,
) -> ModelResult<()> {
    for cell in cells.iter_mut() {
        let temp_k = sensors[cell.sensor().index() as usize].temperature_k();
        let (table, phonons) = cell.scatter_parts();
        for p in phonons.iter_mut() {
            let rates = material.scattering_rates(temp_k, p.frequency, p.polarization);
            let inv_tau = rates.total();
            if inv_tau <= 0.0 {
                continue;
            }
            let scatter_prob = 1.0 - (-time_step_s * inv_tau).exp();
            if rng.r#gen::<f64>() <= scatter_prob {
                let r = rng.r#gen::<f64>();
                if r <= (rates.normal + rates.umklapp) / inv_tau {
                    assign_spectral_state(p, material, table, rng)?;
                    if r > rates.normal / inv_tau {
                        // Umklapp: momentum is not conserved
                        p.set_random_direction(rng.r#gen(), rng.r#gen());
                    }
                } else if rates.impurity > 0.0 {
                    p.set_random_direction(rng.r#gen(), rng.r#gen());
                }
            }
        }
    }
    Ok(())
}

/// Record the step's temperature and heat flux on every sensor.
fn take_measurements(cells: &[Cell], sensors: &mut [Sensor], params: &RunParams) {
    for cell in cells {
        let (net_sign, vx_sum, vy_sum) = cell.sample_moments();
        sensors[cell.sensor().index() as usize].accumulate(net_sign, vx_sum, vy_sum);
    }
    for sensor in sensors.iter_mut() {
        sensor.finalize_step(params.eff_energy_j, params.t_eq_k, params.heat_capacity);
    }
}
