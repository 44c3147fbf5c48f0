//! Monte Carlo phonon particle.

use core::f64::consts::TAU;
use pf_material::Polarization;

/// Position inside a cell [m]. Cells track x against their own boundaries;
/// y is unconstrained in the 1-D chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The x-y components of a 3D unit direction vector.
///
/// The z component is tracked implicitly: |dx| ≤ 1, dx² + dy² ≤ 1. Projected
/// transport in the plane uses exactly these two components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction {
    pub dx: f64,
    pub dy: f64,
}

impl Direction {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Isotropic 3D direction from two uniform draws in [0, 1).
    pub fn isotropic(r1: f64, r2: f64) -> Self {
        let dx = 2.0 * r1 - 1.0;
        let dy = (1.0 - dx * dx).sqrt() * (TAU * r2).cos();
        Self { dx, dy }
    }
}

/// A single simulated heat carrier.
///
/// The sign records whether the particle carries energy above (+1) or below
/// (−1) the equilibrium reference; it is fixed at creation.
#[derive(Clone, Debug)]
pub struct Phonon {
    sign: i8,
    pub position: Point,
    pub direction: Direction,
    /// Angular frequency [rad/s]
    pub frequency: f64,
    /// Group speed magnitude [m/s]
    pub speed: f64,
    pub polarization: Polarization,
    /// Drift budget remaining within the current step [s]
    pub drift_time_s: f64,
    pub active: bool,
}

impl Phonon {
    pub fn new(sign: i8) -> Self {
        Self {
            sign,
            position: Point::default(),
            direction: Direction::new(0.0, 0.0),
            frequency: 0.0,
            speed: 0.0,
            polarization: Polarization::La,
            drift_time_s: 0.0,
            active: true,
        }
    }

    /// Energy sign relative to equilibrium, as a float for accumulation.
    pub fn sign(&self) -> f64 {
        f64::from(self.sign)
    }

    /// Replace the transport properties after emission or scattering.
    pub fn update_properties(&mut self, frequency: f64, speed: f64, polarization: Polarization) {
        self.frequency = frequency;
        self.speed = speed;
        self.polarization = polarization;
    }

    pub fn set_random_direction(&mut self, r1: f64, r2: f64) {
        self.direction = Direction::isotropic(r1, r2);
    }

    /// x velocity component [m/s]
    pub fn vx(&self) -> f64 {
        self.speed * self.direction.dx
    }

    /// y velocity component [m/s]
    pub fn vy(&self) -> f64 {
        self.speed * self.direction.dy
    }

    /// Remove the phonon from play (absorption at an emit surface).
    pub fn deactivate(&mut self) {
        self.active = false;
        self.drift_time_s = 0.0;
    }
}
