//! pf-material: phonon dispersion and relaxation-time material model.
//!
//! Provides:
//! - Quadratic two-branch (LA/TA) dispersion discretized into wavevector bins
//! - Holland-model scattering rates (Normal, Umklapp, Impurity)
//! - Cumulative spectral sampling tables for emission and post-scatter re-sampling
//! - Deviational energy, boundary emission flux, and heat capacity functionals
//!
//! # Architecture
//!
//! `Material` is immutable after construction and shared by reference across
//! all cells of a model. Everything temperature-dependent is a pure function
//! of (temperature, equilibrium temperature); nothing here draws random
//! numbers. Sampling tables are indexed by a uniform draw supplied by the
//! caller, which keeps the simulation generator explicit and seedable.

pub mod dispersion;
pub mod error;
pub mod material;
pub mod relaxation;
pub mod table;

// Re-exports for ergonomics
pub use dispersion::{DispersionData, Polarization};
pub use error::{MaterialError, MaterialResult};
pub use material::{Material, NUM_BINS};
pub use relaxation::{RelaxationData, ScatteringRates};
pub use table::SpectralTable;
