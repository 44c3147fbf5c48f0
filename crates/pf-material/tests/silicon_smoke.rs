//! End-to-end smoke test of the silicon reference material.

use pf_core::{Tolerances, nearly_equal};
use pf_material::{DispersionData, Material, Polarization, RelaxationData};

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
fn emission_table_reaches_both_branches() {
    let mat = silicon();
    let table = mat.emit_table(310.0, 300.0);

    let mut saw_la = false;
    let mut saw_ta = false;
    for i in 0..1000 {
        let r = i as f64 / 1000.0;
        match table.sample(r).unwrap().1 {
            Polarization::La => saw_la = true,
            Polarization::Ta => saw_ta = true,
        }
    }
    assert!(saw_la && saw_ta);
}

#[test]
fn relaxation_times_are_sub_nanosecond_at_room_temperature() {
    let mat = silicon();
    for (freq, pol) in [(5.0e13, Polarization::La), (2.5e13, Polarization::Ta)] {
        let inv_tau = mat.scattering_rates(300.0, freq, pol).total();
        let tau = 1.0 / inv_tau;
        assert!(tau > 1.0e-13 && tau < 1.0e-9, "tau = {tau:e}");
    }
}

#[test]
fn energy_functionals_are_consistent_near_equilibrium() {
    let mat = silicon();
    // For a small deviation, u(T_eq + dT) ≈ c_v(T_eq)·dT.
    let dt = 0.1;
    let u = mat.deviational_energy(300.0 + dt, 300.0);
    let cv = mat.heat_capacity(300.0);
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-3,
    };
    assert!(nearly_equal(u, cv * dt, tol), "u = {u}, cv*dT = {}", cv * dt);
}
