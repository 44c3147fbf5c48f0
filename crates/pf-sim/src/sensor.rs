//! Sensor: thermal state of one or more cells and its measurement history.

use crate::error::{ModelError, ModelResult};

/// Measurement history of one sensor, exported after a run.
///
/// All series have length `num_steps`; the t=0 initial condition is carried
/// separately as `init_temp_k`.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorMeasurements {
    pub sensor_id: u32,
    pub init_temp_k: f64,
    pub temperatures_k: Vec<f64>,
    pub x_fluxes: Vec<f64>,
    pub y_fluxes: Vec<f64>,
}

/// Live thermal state of a sensor.
///
/// Several cells may share one sensor; their areas aggregate here and their
/// per-step population moments are accumulated before `finalize_step`
/// converts them into one temperature/flux sample.
#[derive(Clone, Debug)]
pub struct Sensor {
    id: u32,
    init_temp_k: f64,
    temperature_k: f64,
    area_m2: f64,
    acc_sign: f64,
    acc_vx: f64,
    acc_vy: f64,
    temperatures_k: Vec<f64>,
    x_fluxes: Vec<f64>,
    y_fluxes: Vec<f64>,
}

impl Sensor {
    pub fn new(id: u32, init_temp_k: f64) -> ModelResult<Self> {
        if !(init_temp_k > 0.0 && init_temp_k.is_finite()) {
            return Err(ModelError::InvalidArg {
                what: "sensor initial temperature must be positive",
            });
        }
        Ok(Self {
            id,
            init_temp_k,
            temperature_k: init_temp_k,
            area_m2: 0.0,
            acc_sign: 0.0,
            acc_vx: 0.0,
            acc_vy: 0.0,
            temperatures_k: Vec::new(),
            x_fluxes: Vec::new(),
            y_fluxes: Vec::new(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn init_temp_k(&self) -> f64 {
        self.init_temp_k
    }

    /// Temperature as of the last completed measurement phase.
    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub(crate) fn add_area(&mut self, area_m2: f64) {
        self.area_m2 += area_m2;
    }

    /// Drop accumulated history and return to the initial temperature.
    pub(crate) fn reset(&mut self, num_steps: usize) {
        self.temperature_k = self.init_temp_k;
        self.acc_sign = 0.0;
        self.acc_vx = 0.0;
        self.acc_vy = 0.0;
        self.temperatures_k.clear();
        self.x_fluxes.clear();
        self.y_fluxes.clear();
        self.temperatures_k.reserve(num_steps);
        self.x_fluxes.reserve(num_steps);
        self.y_fluxes.reserve(num_steps);
    }

    /// Add one cell's population moments for the current step.
    pub(crate) fn accumulate(&mut self, net_sign: f64, vx_sum: f64, vy_sum: f64) {
        self.acc_sign += net_sign;
        self.acc_vx += vx_sum;
        self.acc_vy += vy_sum;
    }

    /// Convert the accumulated moments into one measurement sample.
    ///
    /// The temperature inversion is linearized about the equilibrium
    /// temperature: T = T_eq + u/c_v(T_eq).
    pub(crate) fn finalize_step(&mut self, eff_energy_j: f64, t_eq_k: f64, heat_capacity: f64) {
        if self.area_m2 > 0.0 {
            let energy_density = self.acc_sign * eff_energy_j / self.area_m2;
            self.temperature_k = t_eq_k + energy_density / heat_capacity;
            self.x_fluxes.push(eff_energy_j * self.acc_vx / self.area_m2);
            self.y_fluxes.push(eff_energy_j * self.acc_vy / self.area_m2);
        } else {
            // sensor with no cells: hold the current state
            self.x_fluxes.push(0.0);
            self.y_fluxes.push(0.0);
        }
        self.temperatures_k.push(self.temperature_k);
        self.acc_sign = 0.0;
        self.acc_vx = 0.0;
        self.acc_vy = 0.0;
    }

    pub fn measurements(&self) -> SensorMeasurements {
        SensorMeasurements {
            sensor_id: self.id,
            init_temp_k: self.init_temp_k,
            temperatures_k: self.temperatures_k.clone(),
            x_fluxes: self.x_fluxes.clone(),
            y_fluxes: self.y_fluxes.clone(),
        }
    }
}
