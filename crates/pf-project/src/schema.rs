//! Model file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Exactly one material per run.
    pub materials: Vec<MaterialDef>,
    pub settings: SettingsDef,
    #[serde(default)]
    pub sensors: Vec<SensorDef>,
    /// Array order is chain order: it defines cell adjacency.
    #[serde(default)]
    pub cells: Vec<CellDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub d_data: DispersionDef,
    pub r_data: RelaxationDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispersionDef {
    /// Quadratic ω(k) coefficients [c₂, c₁, c₀] of the LA branch.
    pub la_data: Vec<f64>,
    /// TA branch coefficients; empty for single-branch materials.
    #[serde(default)]
    pub ta_data: Vec<f64>,
    pub max_freq_la: f64,
    #[serde(default)]
    pub max_freq_ta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelaxationDef {
    pub b_l: f64,
    pub b_tn: f64,
    pub b_tu: f64,
    pub b_i: f64,
    /// TA Umklapp onset frequency [rad/s]
    pub w: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsDef {
    pub high_temp: f64,
    pub low_temp: f64,
    pub sim_time: f64,
    /// Physical time step [s]; defaults to 5e-12.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step: Option<f64>,
    /// Target simulated phonon count; defaults to 10,000,000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_phonons: Option<u64>,
    /// Generator seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorDef {
    pub id: u32,
    pub t_init: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellDef {
    pub length: f64,
    pub width: f64,
    #[serde(rename = "sensorID")]
    pub sensor_id: u32,
}
