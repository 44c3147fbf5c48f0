//! Relaxation-time scattering model (Holland).
//!
//! Branch-resolved inverse relaxation times:
//! - LA:  1/τ_N = b_l·ω²·T³, no Umklapp channel of its own
//! - TA:  1/τ_N = b_tn·ω·T⁴; 1/τ_U = b_tu·ω²/sinh(ħω/k_BT) above the onset
//!   frequency `w`, zero below it
//! - Impurity (both branches): 1/τ_I = b_i·ω⁴

use crate::dispersion::Polarization;
use crate::error::{MaterialError, MaterialResult};
use pf_core::units::constants::{BOLTZMANN_J_PER_K, HBAR_J_S};

/// Validated relaxation coefficients.
#[derive(Clone, Copy, Debug)]
pub struct RelaxationData {
    pub b_l: f64,
    pub b_tn: f64,
    pub b_tu: f64,
    pub b_i: f64,
    /// TA Umklapp onset frequency [rad/s]
    pub w: f64,
}

impl RelaxationData {
    pub fn new(b_l: f64, b_tn: f64, b_tu: f64, b_i: f64, w: f64) -> MaterialResult<Self> {
        for (value, what) in [
            (b_l, "b_l"),
            (b_tn, "b_tn"),
            (b_tu, "b_tu"),
            (b_i, "b_i"),
            (w, "w"),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(MaterialError::InvalidRelaxation { what });
            }
        }
        Ok(Self {
            b_l,
            b_tn,
            b_tu,
            b_i,
            w,
        })
    }

    /// Inverse relaxation times at a local temperature for one phonon state.
    pub fn rates(&self, temp_k: f64, freq: f64, polarization: Polarization) -> ScatteringRates {
        let (normal, umklapp) = match polarization {
            Polarization::La => (self.b_l * freq * freq * temp_k.powi(3), 0.0),
            Polarization::Ta => {
                let normal = self.b_tn * freq * temp_k.powi(4);
                let umklapp = if freq < self.w {
                    0.0
                } else {
                    let x = HBAR_J_S * freq / (BOLTZMANN_J_PER_K * temp_k);
                    self.b_tu * freq * freq / x.sinh()
                };
                (normal, umklapp)
            }
        };
        ScatteringRates {
            normal,
            umklapp,
            impurity: self.b_i * freq.powi(4),
        }
    }
}

/// Branch-resolved inverse relaxation times [1/s].
#[derive(Clone, Copy, Debug, Default)]
pub struct ScatteringRates {
    pub normal: f64,
    pub umklapp: f64,
    pub impurity: f64,
}

impl ScatteringRates {
    /// Total inverse relaxation time 1/τ.
    pub fn total(&self) -> f64 {
        self.normal + self.umklapp + self.impurity
    }
}
