//! Model: topology validation, energy budget, and run orchestration.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::cell::{Cell, EmitSchedule};
use crate::error::{ModelError, ModelResult};
use crate::sensor::{Sensor, SensorMeasurements};
use crate::simulator::{self, RunParams, SimOptions, StepProgress};
use crate::surface::{Surface, SurfaceLocation};
use pf_core::units::{Length, Temperature, Time};
use pf_core::{CellId, SensorId, ensure_finite};
use pf_material::Material;

/// Energy discretization of a run.
///
/// Physical energy is conserved by fixing the number of simulated phonons
/// and solving for the energy each one represents.
#[derive(Clone, Copy, Debug)]
pub struct EnergyBudget {
    /// Initial deviational energy plus boundary emission over the whole run [J]
    pub total_energy_j: f64,
    /// Energy represented by one simulated phonon [J]
    pub eff_energy_j: f64,
    /// Phonons seeded at t=0 across all cells
    pub initial_phonons: u64,
    /// Expected boundary emissions per step across both emit surfaces
    pub emitted_per_step: f64,
}

/// A 1-D chain of cells sharing one material, driven between two fixed
/// boundary temperatures.
///
/// Cells are appended in configuration order, which defines chain adjacency.
pub struct Model {
    material: Material,
    cells: Vec<Cell>,
    sensors: Vec<Sensor>,
    high_temp_k: f64,
    low_temp_k: f64,
    sim_time_s: f64,
    t_eq_k: f64,
}

impl Model {
    pub fn new(
        material: Material,
        high_temp: Temperature,
        low_temp: Temperature,
        sim_time: Time,
    ) -> ModelResult<Self> {
        let high_temp_k = high_temp.value;
        let low_temp_k = low_temp.value;
        let sim_time_s = sim_time.value;
        if !(high_temp_k > 0.0 && high_temp_k.is_finite()) {
            return Err(ModelError::InvalidArg {
                what: "high boundary temperature must be positive",
            });
        }
        if !(low_temp_k > 0.0 && low_temp_k.is_finite()) {
            return Err(ModelError::InvalidArg {
                what: "low boundary temperature must be positive",
            });
        }
        if !(sim_time_s > 0.0 && sim_time_s.is_finite()) {
            return Err(ModelError::InvalidArg {
                what: "simulated time must be positive",
            });
        }
        Ok(Self {
            material,
            cells: Vec::new(),
            sensors: Vec::new(),
            high_temp_k,
            low_temp_k,
            sim_time_s,
            t_eq_k: (high_temp_k + low_temp_k) / 2.0,
        })
    }

    /// Equilibrium (zero-reference) temperature, (high + low)/2.
    pub fn t_eq_k(&self) -> f64 {
        self.t_eq_k
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Register a sensor. Fails if the id is already taken.
    pub fn add_sensor(&mut self, id: u32, init_temp: Temperature) -> ModelResult<()> {
        if self.sensors.iter().any(|s| s.id() == id) {
            return Err(ModelError::DuplicateSensorId { id });
        }
        self.sensors.push(Sensor::new(id, init_temp.value)?);
        Ok(())
    }

    /// Append a cell to the chain, linked to an existing sensor.
    ///
    /// Config order is chain order; it defines adjacency and is preserved
    /// exactly.
    pub fn add_cell(&mut self, length: Length, width: Length, sensor_id: u32) -> ModelResult<()> {
        let Some(index) = self.sensors.iter().position(|s| s.id() == sensor_id) else {
            return Err(ModelError::UnknownSensorRef { id: sensor_id });
        };
        let cell = Cell::new(length.value, width.value, SensorId::from_index(index as u32))?;
        self.sensors[index].add_area(cell.area_m2());
        self.cells.push(cell);
        Ok(())
    }

    /// Compute the run's energy discretization without mutating the model.
    pub fn energy_budget(&self, opts: &SimOptions) -> ModelResult<EnergyBudget> {
        validate_options(opts)?;
        let count = self.cells.len();
        if count < 2 {
            return Err(ModelError::InsufficientCells { count });
        }

        let mut initial_energy = 0.0;
        for cell in &self.cells {
            let t0 = self.sensors[cell.sensor().index() as usize].init_temp_k();
            initial_energy +=
                self.material.deviational_energy(t0, self.t_eq_k).abs() * cell.area_m2();
        }

        let high_flux = self.material.emit_flux(self.high_temp_k, self.t_eq_k);
        let low_flux = self.material.emit_flux(self.low_temp_k, self.t_eq_k);
        let emit_power =
            high_flux * self.cells[0].width_m() + low_flux * self.cells[count - 1].width_m();
        let total_energy_j = ensure_finite(
            initial_energy + emit_power * self.sim_time_s,
            "total deviational energy",
        )?;
        if !(total_energy_j > 0.0) {
            return Err(ModelError::InvalidArg {
                what: "model has no deviational energy to discretize",
            });
        }

        let eff_energy_j = total_energy_j / opts.target_phonons as f64;
        let mut initial_phonons = 0u64;
        for cell in &self.cells {
            let t0 = self.sensors[cell.sensor().index() as usize].init_temp_k();
            let init_e = self.material.deviational_energy(t0, self.t_eq_k).abs() * cell.area_m2();
            initial_phonons += (init_e / eff_energy_j) as u64;
        }

        Ok(EnergyBudget {
            total_energy_j,
            eff_energy_j,
            initial_phonons,
            emitted_per_step: emit_power * opts.time_step_s / eff_energy_j,
        })
    }

    /// Run the simulation and hand back every sensor's measurement history
    /// in sensor-addition order.
    pub fn run(&mut self, opts: &SimOptions) -> ModelResult<Vec<SensorMeasurements>> {
        self.run_with_progress(opts, None)
    }

    pub fn run_with_progress(
        &mut self,
        opts: &SimOptions,
        progress: Option<&mut dyn FnMut(&StepProgress)>,
    ) -> ModelResult<Vec<SensorMeasurements>> {
        let budget = self.energy_budget(opts)?;
        let num_steps = (self.sim_time_s / opts.time_step_s) as usize;
        if num_steps == 0 {
            return Err(ModelError::InvalidArg {
                what: "simulated time is shorter than one time step",
            });
        }

        self.wire_surfaces()?;
        info!(
            total_energy_j = budget.total_energy_j,
            eff_energy_j = budget.eff_energy_j,
            initial_phonons = budget.initial_phonons,
            num_steps,
            "starting simulation run"
        );
        self.prepare_cells(budget.eff_energy_j, opts.time_step_s);
        for sensor in &mut self.sensors {
            sensor.reset(num_steps);
        }

        let params = RunParams {
            t_eq_k: self.t_eq_k,
            eff_energy_j: budget.eff_energy_j,
            heat_capacity: self.material.heat_capacity(self.t_eq_k),
            time_step_s: opts.time_step_s,
            num_steps,
        };
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        simulator::run_steps(
            &mut self.cells,
            &mut self.sensors,
            &self.material,
            &params,
            &mut rng,
            progress,
        )?;
        debug!("run complete");

        Ok(self.sensors.iter().map(Sensor::measurements).collect())
    }

    /// Wire the chain: emit surfaces at the ends, transitions in between.
    fn wire_surfaces(&mut self) -> ModelResult<()> {
        let count = self.cells.len();
        if count < 2 {
            return Err(ModelError::InsufficientCells { count });
        }
        self.cells[0].set_emit_surface(SurfaceLocation::Left, self.high_temp_k);
        self.cells[0].set_transition_surface(SurfaceLocation::Right, CellId::from_index(1));
        for i in 1..count - 1 {
            self.cells[i]
                .set_transition_surface(SurfaceLocation::Left, CellId::from_index(i as u32 - 1));
            self.cells[i]
                .set_transition_surface(SurfaceLocation::Right, CellId::from_index(i as u32 + 1));
        }
        self.cells[count - 1]
            .set_transition_surface(SurfaceLocation::Left, CellId::from_index(count as u32 - 2));
        self.cells[count - 1].set_emit_surface(SurfaceLocation::Right, self.low_temp_k);
        Ok(())
    }

    /// Precompute per-cell sampling tables, initial counts, and emission
    /// schedules for the run's effective energy and time step.
    fn prepare_cells(&mut self, eff_energy_j: f64, time_step_s: f64) {
        let t_eq = self.t_eq_k;
        let Model {
            material,
            cells,
            sensors,
            ..
        } = self;
        for cell in cells.iter_mut() {
            let t0 = sensors[cell.sensor().index() as usize].init_temp_k();
            let init_e = material.deviational_energy(t0, t_eq).abs() * cell.area_m2();
            cell.init_phonons = (init_e / eff_energy_j) as usize;
            cell.init_sign = if t0 > t_eq { 1 } else { -1 };
            cell.base_table = material.base_table(t0, t_eq);
            cell.scatter_table = material.scatter_table(t_eq);

            let mut schedules = Vec::new();
            for location in [SurfaceLocation::Left, SurfaceLocation::Right] {
                if let Some(Surface::Emit { temp_k }) = cell.surface(location) {
                    let temp_k = *temp_k;
                    let phonons_per_step =
                        material.emit_flux(temp_k, t_eq) * cell.width_m() * time_step_s
                            / eff_energy_j;
                    schedules.push(EmitSchedule {
                        location,
                        temp_k,
                        table: material.emit_table(temp_k, t_eq),
                        phonons_per_step,
                    });
                }
            }
            cell.emit_schedules = schedules;
            cell.clear_population();
        }
    }
}

fn validate_options(opts: &SimOptions) -> ModelResult<()> {
    if !(opts.time_step_s > 0.0 && opts.time_step_s.is_finite()) {
        return Err(ModelError::InvalidArg {
            what: "time step must be positive",
        });
    }
    if opts.target_phonons == 0 {
        return Err(ModelError::InvalidArg {
            what: "target phonon count must be positive",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{k, m, s};
    use pf_material::{DispersionData, RelaxationData};

    fn trivial_material() -> Material {
        Material::new(
            DispersionData::new(&[0.0, 5000.0, 0.0], 5.0e13, &[], 0.0).unwrap(),
            RelaxationData::new(1.0e-24, 0.0, 0.0, 0.0, 0.0).unwrap(),
        )
        .unwrap()
    }

    fn model() -> Model {
        Model::new(trivial_material(), k(310.0), k(290.0), s(5.0e-10)).unwrap()
    }

    #[test]
    fn equilibrium_temperature_is_the_midpoint() {
        assert_eq!(model().t_eq_k(), 300.0);
    }

    #[test]
    fn duplicate_sensor_id_is_rejected() {
        let mut m = model();
        m.add_sensor(0, k(300.0)).unwrap();
        let err = m.add_sensor(0, k(305.0)).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSensorId { id: 0 }));
        assert_eq!(m.sensors().len(), 1);
    }

    #[test]
    fn unknown_sensor_reference_leaves_the_chain_unmodified() {
        let mut mo = model();
        mo.add_sensor(0, k(300.0)).unwrap();
        let err = mo.add_cell(m(1.0e-6), m(1.0e-7), 9).unwrap_err();
        assert!(matches!(err, ModelError::UnknownSensorRef { id: 9 }));
        assert!(mo.cells().is_empty());
    }

    #[test]
    fn cell_area_accumulates_on_the_sensor() {
        let mut mo = model();
        mo.add_sensor(0, k(300.0)).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        assert!((mo.sensors()[0].area_m2() - 2.0e-13).abs() < 1e-26);
    }

    #[test]
    fn run_with_one_cell_fails_before_any_sampling() {
        let mut mo = model();
        mo.add_sensor(0, k(300.0)).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        let err = mo.run(&SimOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientCells { count: 1 }));
        assert!(mo.sensors()[0].measurements().temperatures_k.is_empty());
        assert_eq!(mo.cells()[0].phonon_count(), 0);
    }

    #[test]
    fn fully_equilibrium_model_has_no_energy_to_discretize() {
        let mut mo = Model::new(trivial_material(), k(300.0), k(300.0), s(5.0e-10)).unwrap();
        mo.add_sensor(0, k(300.0)).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        let err = mo.run(&SimOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArg { .. }));
    }

    #[test]
    fn energy_budget_discretizes_to_the_target_count() {
        let mut mo = model();
        mo.add_sensor(0, k(305.0)).unwrap();
        mo.add_sensor(1, k(295.0)).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
        mo.add_cell(m(1.0e-6), m(1.0e-7), 1).unwrap();

        let opts = SimOptions {
            target_phonons: 10_000,
            seed: Some(1),
            ..SimOptions::default()
        };
        let budget = mo.energy_budget(&opts).unwrap();
        assert!(budget.total_energy_j > 0.0);
        assert!(
            (budget.total_energy_j / budget.eff_energy_j - 10_000.0).abs() < 1e-6
        );

        // initial + scheduled emission over the run ≈ target (floors only)
        let num_steps = (5.0e-10 / opts.time_step_s) as usize;
        let scheduled = budget.initial_phonons as f64 + budget.emitted_per_step * num_steps as f64;
        assert!((scheduled - 10_000.0).abs() / 10_000.0 < 0.01, "scheduled = {scheduled}");
    }
}
