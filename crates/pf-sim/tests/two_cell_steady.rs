//! Integration test: 2-cell chain between 310 K and 290 K boundaries.
//!
//! With a trivial single-branch material (no Umklapp, no impurity
//! scattering) the chain relaxes toward a linear profile whose midpoint is
//! the boundary average. Checks the steady-state window statistics and the
//! boundary surface clamp.

use pf_core::units::{k, m, s};
use pf_material::{DispersionData, Material, RelaxationData};
use pf_sim::{Model, SimOptions, Surface, SurfaceLocation};

fn trivial_material() -> Material {
    Material::new(
        DispersionData::new(&[0.0, 5000.0, 0.0], 5.0e13, &[], 0.0).unwrap(),
        RelaxationData::new(1.0e-24, 0.0, 0.0, 0.0, 0.0).unwrap(),
    )
    .unwrap()
}

fn two_cell_model() -> Model {
    let mut model = Model::new(trivial_material(), k(310.0), k(290.0), s(5.0e-10)).unwrap();
    model.add_sensor(0, k(300.0)).unwrap();
    model.add_sensor(1, k(300.0)).unwrap();
    model.add_cell(m(1.0e-6), m(1.0e-7), 0).unwrap();
    model.add_cell(m(1.0e-6), m(1.0e-7), 1).unwrap();
    model
}

fn trailing_mean(series: &[f64], window: usize) -> f64 {
    let tail = &series[series.len() - window..];
    tail.iter().sum::<f64>() / window as f64
}

#[test]
fn midpoint_approaches_the_boundary_average() {
    let mut model = two_cell_model();
    let opts = SimOptions {
        target_phonons: 40_000,
        seed: Some(42),
        ..SimOptions::default()
    };
    let measurements = model.run(&opts).unwrap();

    assert_eq!(measurements.len(), 2);
    let num_steps = measurements[0].temperatures_k.len();
    assert_eq!(num_steps, 100);
    for m in &measurements {
        assert_eq!(m.temperatures_k.len(), num_steps);
        assert_eq!(m.x_fluxes.len(), num_steps);
        assert_eq!(m.y_fluxes.len(), num_steps);
    }

    let window = num_steps / 10;
    let hot = trailing_mean(&measurements[0].temperatures_k, window);
    let cold = trailing_mean(&measurements[1].temperatures_k, window);

    // the gradient points the right way and stays inside the boundaries
    assert!(hot > cold, "hot = {hot}, cold = {cold}");
    assert!(hot < 310.0 && hot > 290.0);
    assert!(cold < 310.0 && cold > 290.0);

    // midpoint of the 2-cell chain sits at (high + low)/2 within MC tolerance
    let midpoint = (hot + cold) / 2.0;
    assert!((midpoint - 300.0).abs() < 5.0, "midpoint = {midpoint}");
}

#[test]
fn heat_flux_points_from_hot_to_cold() {
    let mut model = two_cell_model();
    let opts = SimOptions {
        target_phonons: 40_000,
        seed: Some(7),
        ..SimOptions::default()
    };
    let measurements = model.run(&opts).unwrap();

    let num_steps = measurements[0].x_fluxes.len();
    let window = num_steps / 2;
    for m in &measurements {
        assert!(trailing_mean(&m.x_fluxes, window) > 0.0);
    }
}

#[test]
fn emit_surfaces_hold_their_boundary_temperatures() {
    let mut model = two_cell_model();
    let opts = SimOptions {
        target_phonons: 20_000,
        seed: Some(3),
        ..SimOptions::default()
    };
    model.run(&opts).unwrap();

    match model.cells()[0].surface(SurfaceLocation::Left) {
        Some(Surface::Emit { temp_k }) => assert_eq!(*temp_k, 310.0),
        other => panic!("expected left emit surface, got {other:?}"),
    }
    match model.cells()[1].surface(SurfaceLocation::Right) {
        Some(Surface::Emit { temp_k }) => assert_eq!(*temp_k, 290.0),
        other => panic!("expected right emit surface, got {other:?}"),
    }
    // interior boundary stayed a transition
    assert!(matches!(
        model.cells()[0].surface(SurfaceLocation::Right),
        Some(Surface::Transition { .. })
    ));
}
