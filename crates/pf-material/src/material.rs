//! Material: discretized dispersion + relaxation physics + sampling tables.

use crate::dispersion::{BranchBins, DispersionData, Polarization};
use crate::error::MaterialResult;
use crate::relaxation::{RelaxationData, ScatteringRates};
use crate::table::SpectralTable;
use pf_core::units::constants::{BOLTZMANN_J_PER_K, HBAR_J_S};

/// Wavevector bins per branch.
pub const NUM_BINS: usize = 1000;

/// Immutable material shared by every cell of a model.
#[derive(Clone, Debug)]
pub struct Material {
    la: BranchBins,
    ta: Option<BranchBins>,
    relaxation: RelaxationData,
}

impl Material {
    pub fn new(dispersion: DispersionData, relaxation: RelaxationData) -> MaterialResult<Self> {
        let la = BranchBins::discretize(
            dispersion.la,
            dispersion.max_freq_la,
            Polarization::La,
            NUM_BINS,
        )?;
        let ta = dispersion
            .ta
            .map(|c| BranchBins::discretize(c, dispersion.max_freq_ta, Polarization::Ta, NUM_BINS))
            .transpose()?;
        Ok(Self {
            la,
            ta,
            relaxation,
        })
    }

    fn branches(&self) -> impl Iterator<Item = &BranchBins> {
        core::iter::once(&self.la).chain(self.ta.as_ref())
    }

    /// Angular frequency of a sampled (bin, branch) pair [rad/s].
    ///
    /// `bin` must come from a table built by this material.
    pub fn frequency(&self, bin: usize, polarization: Polarization) -> f64 {
        match polarization {
            Polarization::La => self.la.freqs[bin],
            Polarization::Ta => self.ta.as_ref().map_or(0.0, |b| b.freqs[bin]),
        }
    }

    /// Group speed of a sampled (bin, branch) pair [m/s].
    pub fn velocity(&self, bin: usize, polarization: Polarization) -> f64 {
        match polarization {
            Polarization::La => self.la.speeds[bin],
            Polarization::Ta => self.ta.as_ref().map_or(0.0, |b| b.speeds[bin]),
        }
    }

    /// Branch-resolved inverse relaxation times at a local temperature.
    pub fn scattering_rates(
        &self,
        temp_k: f64,
        freq: f64,
        polarization: Polarization,
    ) -> ScatteringRates {
        self.relaxation.rates(temp_k, freq, polarization)
    }

    /// Signed deviational energy density between `temp_k` and `t_eq_k` [J/m³].
    pub fn deviational_energy(&self, temp_k: f64, t_eq_k: f64) -> f64 {
        self.branches()
            .flat_map(|b| {
                b.freqs.iter().zip(&b.dos).map(move |(w, dos)| {
                    HBAR_J_S * w * dos * (bose_einstein(*w, temp_k) - bose_einstein(*w, t_eq_k))
                })
            })
            .sum()
    }

    /// Effusive deviational energy flux off a boundary at `temp_k` [W/m²].
    pub fn emit_flux(&self, temp_k: f64, t_eq_k: f64) -> f64 {
        0.25 * self
            .branches()
            .flat_map(|b| {
                b.freqs
                    .iter()
                    .zip(&b.speeds)
                    .zip(&b.dos)
                    .map(move |((w, v), dos)| {
                        HBAR_J_S
                            * w
                            * v
                            * dos
                            * (bose_einstein(*w, temp_k) - bose_einstein(*w, t_eq_k)).abs()
                    })
            })
            .sum::<f64>()
    }

    /// Volumetric heat capacity at `temp_k` [J/(m³·K)].
    pub fn heat_capacity(&self, temp_k: f64) -> f64 {
        self.branches()
            .flat_map(|b| {
                b.freqs
                    .iter()
                    .zip(&b.dos)
                    .map(move |(w, dos)| HBAR_J_S * w * dos * d_bose_dt(*w, temp_k))
            })
            .sum()
    }

    /// Sampling table for the initial deviational population of a cell at
    /// `temp_k` against the equilibrium temperature.
    pub fn base_table(&self, temp_k: f64, t_eq_k: f64) -> SpectralTable {
        SpectralTable::from_weights(self.branches().flat_map(|b| {
            b.freqs.iter().zip(&b.dos).enumerate().map(move |(i, (w, dos))| {
                let weight =
                    HBAR_J_S * w * dos * (bose_einstein(*w, temp_k) - bose_einstein(*w, t_eq_k)).abs();
                (i, b.polarization, weight)
            })
        }))
    }

    /// Flux-weighted sampling table for boundary emission at `temp_k`.
    pub fn emit_table(&self, temp_k: f64, t_eq_k: f64) -> SpectralTable {
        SpectralTable::from_weights(self.branches().flat_map(|b| {
            b.freqs
                .iter()
                .zip(&b.speeds)
                .zip(&b.dos)
                .enumerate()
                .map(move |(i, ((w, v), dos))| {
                    let weight = HBAR_J_S
                        * w
                        * v
                        * dos
                        * (bose_einstein(*w, temp_k) - bose_einstein(*w, t_eq_k)).abs();
                    (i, b.polarization, weight)
                })
        }))
    }

    /// Collisional sampling table for post-scatter re-sampling at equilibrium.
    pub fn scatter_table(&self, t_eq_k: f64) -> SpectralTable {
        SpectralTable::from_weights(self.branches().flat_map(|b| {
            b.freqs.iter().zip(&b.dos).enumerate().map(move |(i, (w, dos))| {
                let inv_tau = self.relaxation.rates(t_eq_k, *w, b.polarization).total();
                let weight = HBAR_J_S * w * dos * d_bose_dt(*w, t_eq_k) * inv_tau;
                (i, b.polarization, weight)
            })
        }))
    }
}

/// Bose–Einstein occupancy n(ω, T).
fn bose_einstein(freq: f64, temp_k: f64) -> f64 {
    let x = HBAR_J_S * freq / (BOLTZMANN_J_PER_K * temp_k);
    x.exp_m1().recip()
}

/// ∂n/∂T at fixed ω.
fn d_bose_dt(freq: f64, temp_k: f64) -> f64 {
    let x = HBAR_J_S * freq / (BOLTZMANN_J_PER_K * temp_k);
    let ex = x.exp();
    if !ex.is_finite() {
        return 0.0;
    }
    let em1 = ex - 1.0;
    (x / temp_k) * ex / (em1 * em1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silicon() -> Material {
        let dispersion = DispersionData::new(
            &[-2.22e-7, 9260.0, 0.0],
            7.63e13,
            &[-2.28e-7, 5240.0, 0.0],
            2.97e13,
        )
        .unwrap();
        let relaxation = RelaxationData::new(2.0e-24, 9.3e-13, 5.5e-18, 1.2e-45, 2.42e13).unwrap();
        Material::new(dispersion, relaxation).unwrap()
    }

    #[test]
    fn occupancy_grows_with_temperature() {
        assert!(bose_einstein(5e13, 310.0) > bose_einstein(5e13, 290.0));
        assert!(d_bose_dt(5e13, 300.0) > 0.0);
    }

    #[test]
    fn deviational_energy_is_signed() {
        let mat = silicon();
        assert!(mat.deviational_energy(310.0, 300.0) > 0.0);
        assert!(mat.deviational_energy(290.0, 300.0) < 0.0);
        assert_eq!(mat.deviational_energy(300.0, 300.0), 0.0);
    }

    #[test]
    fn heat_capacity_is_positive() {
        assert!(silicon().heat_capacity(300.0) > 0.0);
    }

    #[test]
    fn emit_flux_is_symmetric_in_sign_of_deviation() {
        let mat = silicon();
        let hot = mat.emit_flux(305.0, 300.0);
        let cold = mat.emit_flux(295.0, 300.0);
        assert!(hot > 0.0);
        assert!((hot - cold).abs() / hot < 0.05);
    }

    #[test]
    fn equilibrium_base_table_is_empty() {
        let mat = silicon();
        assert!(mat.base_table(300.0, 300.0).is_empty());
        assert!(!mat.base_table(310.0, 300.0).is_empty());
    }

    #[test]
    fn sampled_bins_map_to_transport_properties() {
        let mat = silicon();
        let table = mat.emit_table(310.0, 300.0);
        for r in [0.0, 0.25, 0.5, 0.75, 0.999] {
            let (bin, pol) = table.sample(r).unwrap();
            assert!(mat.frequency(bin, pol) > 0.0);
            assert!(mat.velocity(bin, pol) > 0.0);
        }
    }

    #[test]
    fn scatter_table_tracks_relaxation_rates() {
        let mat = silicon();
        assert!(!mat.scatter_table(300.0).is_empty());
    }
}
