//! Acoustic branch dispersion relations.
//!
//! Each branch is described by quadratic coefficients of ω(k) = c₂k² + c₁k + c₀
//! (highest order first, as they appear in model configuration files) together
//! with the branch maximum frequency. The wavevector range [0, k_max] is
//! recovered by inverting the quadratic at the maximum frequency.

use crate::error::{MaterialError, MaterialResult};

/// Acoustic phonon branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarization {
    /// Longitudinal acoustic (LA)
    La,
    /// Transverse acoustic (TA)
    Ta,
}

impl core::fmt::Display for Polarization {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Polarization::La => write!(f, "LA"),
            Polarization::Ta => write!(f, "TA"),
        }
    }
}

/// Validated dispersion input for a material.
///
/// The LA branch is mandatory; the TA branch may be absent (empty coefficient
/// array), which models single-branch materials.
#[derive(Clone, Debug)]
pub struct DispersionData {
    pub(crate) la: [f64; 3],
    pub(crate) max_freq_la: f64,
    pub(crate) ta: Option<[f64; 3]>,
    pub(crate) max_freq_ta: f64,
}

impl DispersionData {
    pub fn new(
        la: &[f64],
        max_freq_la: f64,
        ta: &[f64],
        max_freq_ta: f64,
    ) -> MaterialResult<Self> {
        let la = coeffs(la, "la_data must hold 3 quadratic coefficients")?;
        if !(max_freq_la > 0.0 && max_freq_la.is_finite()) {
            return Err(MaterialError::NonPhysical {
                what: "max_freq_la",
                value: max_freq_la,
            });
        }
        let ta = if ta.is_empty() {
            None
        } else {
            let ta = coeffs(ta, "ta_data must hold 3 quadratic coefficients or be empty")?;
            if !(max_freq_ta > 0.0 && max_freq_ta.is_finite()) {
                return Err(MaterialError::NonPhysical {
                    what: "max_freq_ta",
                    value: max_freq_ta,
                });
            }
            Some(ta)
        };
        Ok(Self {
            la,
            max_freq_la,
            ta,
            max_freq_ta,
        })
    }
}

fn coeffs(data: &[f64], what: &'static str) -> MaterialResult<[f64; 3]> {
    match data {
        [c2, c1, c0] if data.iter().all(|c| c.is_finite()) => Ok([*c2, *c1, *c0]),
        _ => Err(MaterialError::InvalidDispersion { what }),
    }
}

/// One branch discretized into wavevector bins at bin centers.
#[derive(Clone, Debug)]
pub(crate) struct BranchBins {
    pub(crate) polarization: Polarization,
    /// Angular frequency per bin [rad/s]
    pub(crate) freqs: Vec<f64>,
    /// Group speed |dω/dk| per bin [m/s]
    pub(crate) speeds: Vec<f64>,
    /// Density-of-states weight k²Δk/(2π²) per bin [1/m³]
    pub(crate) dos: Vec<f64>,
}

impl BranchBins {
    pub(crate) fn discretize(
        c: [f64; 3],
        max_freq: f64,
        polarization: Polarization,
        num_bins: usize,
    ) -> MaterialResult<Self> {
        let k_max = solve_k_max(c, max_freq)?;
        let dk = k_max / num_bins as f64;
        let mut freqs = Vec::with_capacity(num_bins);
        let mut speeds = Vec::with_capacity(num_bins);
        let mut dos = Vec::with_capacity(num_bins);
        for i in 0..num_bins {
            let k = (i as f64 + 0.5) * dk;
            let w = c[0] * k * k + c[1] * k + c[2];
            if !(w > 0.0 && w.is_finite()) {
                return Err(MaterialError::InvalidDispersion {
                    what: "dispersion relation is not positive over (0, k_max]",
                });
            }
            freqs.push(w);
            speeds.push((2.0 * c[0] * k + c[1]).abs());
            dos.push(k * k * dk / (2.0 * core::f64::consts::PI.powi(2)));
        }
        Ok(Self {
            polarization,
            freqs,
            speeds,
            dos,
        })
    }
}

/// Invert ω(k_max) = ω_max for the branch wavevector range.
///
/// Picks the smallest positive root so the discretization stays on the
/// rising part of the branch (below the zone-boundary turnover).
fn solve_k_max(c: [f64; 3], max_freq: f64) -> MaterialResult<f64> {
    let [c2, c1, c0] = c;
    if c2 == 0.0 {
        if c1 <= 0.0 {
            return Err(MaterialError::InvalidDispersion {
                what: "linear dispersion requires a positive sound velocity",
            });
        }
        return Ok((max_freq - c0) / c1);
    }
    let disc = c1 * c1 - 4.0 * c2 * (c0 - max_freq);
    if disc < 0.0 {
        return Err(MaterialError::InvalidDispersion {
            what: "branch max frequency is not reachable by the dispersion relation",
        });
    }
    let sqrt_disc = disc.sqrt();
    let roots = [
        (-c1 + sqrt_disc) / (2.0 * c2),
        (-c1 - sqrt_disc) / (2.0 * c2),
    ];
    roots
        .into_iter()
        .filter(|k| *k > 0.0 && k.is_finite())
        .fold(None, |best: Option<f64>, k| {
            Some(best.map_or(k, |b| b.min(k)))
        })
        .ok_or(MaterialError::InvalidDispersion {
            what: "no positive wavevector solves the branch max frequency",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Silicon LA branch, Brillouin-zone edge near 1.13e10 1/m.
    const SI_LA: [f64; 3] = [-2.22e-7, 9260.0, 0.0];
    const SI_LA_WMAX: f64 = 7.63e13;

    #[test]
    fn quadratic_k_max_matches_zone_edge() {
        let k_max = solve_k_max(SI_LA, SI_LA_WMAX).unwrap();
        assert!((k_max - 1.13e10).abs() / 1.13e10 < 0.02, "k_max = {k_max}");
    }

    #[test]
    fn linear_branch_inverts_directly() {
        let k_max = solve_k_max([0.0, 5000.0, 0.0], 5e13).unwrap();
        assert_eq!(k_max, 1e10);
    }

    #[test]
    fn unreachable_max_frequency_is_rejected() {
        // Peak of the Si LA branch is ~9.7e13 rad/s; asking far above it fails.
        assert!(solve_k_max(SI_LA, 1.2e14).is_err());
    }

    #[test]
    fn bins_are_monotone_with_positive_speeds() {
        let bins = BranchBins::discretize(SI_LA, SI_LA_WMAX, Polarization::La, 100).unwrap();
        assert_eq!(bins.freqs.len(), 100);
        assert!(bins.freqs.windows(2).all(|w| w[0] < w[1]));
        assert!(bins.freqs.iter().all(|w| *w < SI_LA_WMAX));
        assert!(bins.speeds.iter().all(|v| *v > 0.0));
        assert!(bins.dos.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn missing_ta_branch_is_allowed() {
        let d = DispersionData::new(&SI_LA, SI_LA_WMAX, &[], 0.0).unwrap();
        assert!(d.ta.is_none());
    }

    #[test]
    fn short_coefficient_array_is_rejected() {
        assert!(DispersionData::new(&[1.0, 2.0], 1e13, &[], 0.0).is_err());
    }
}
