//! Model file validation logic.
//!
//! Validation runs before any model object is built, so configuration
//! defects surface with the offending id/field instead of failing deep in
//! setup. The sim crate re-checks its own contracts (duplicate sensor,
//! unknown reference, insufficient cells) at model level.

use crate::schema::Project;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: u32, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: u32, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

fn invalid(field: &str, value: impl std::fmt::Display, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.materials.len() != 1 {
        return Err(invalid(
            "materials",
            project.materials.len(),
            "exactly one material per run",
        ));
    }

    let material = &project.materials[0];
    if material.d_data.la_data.len() != 3 {
        return Err(invalid(
            "la_data",
            material.d_data.la_data.len(),
            "expected 3 quadratic dispersion coefficients",
        ));
    }
    require_positive("max_freq_la", material.d_data.max_freq_la)?;
    if !material.d_data.ta_data.is_empty() {
        if material.d_data.ta_data.len() != 3 {
            return Err(invalid(
                "ta_data",
                material.d_data.ta_data.len(),
                "expected 3 quadratic dispersion coefficients or an empty array",
            ));
        }
        require_positive("max_freq_ta", material.d_data.max_freq_ta)?;
    }
    for (field, value) in [
        ("b_l", material.r_data.b_l),
        ("b_tn", material.r_data.b_tn),
        ("b_tu", material.r_data.b_tu),
        ("b_i", material.r_data.b_i),
        ("w", material.r_data.w),
    ] {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(invalid(field, value, "must be non-negative and finite"));
        }
    }

    require_positive("high_temp", project.settings.high_temp)?;
    require_positive("low_temp", project.settings.low_temp)?;
    require_positive("sim_time", project.settings.sim_time)?;
    if let Some(time_step) = project.settings.time_step {
        require_positive("time_step", time_step)?;
    }
    if project.settings.num_phonons == Some(0) {
        return Err(invalid("num_phonons", 0, "must be at least 1"));
    }

    let mut sensor_ids = HashSet::new();
    for sensor in &project.sensors {
        if !sensor_ids.insert(sensor.id) {
            return Err(ValidationError::DuplicateId {
                id: sensor.id,
                context: "sensors".to_string(),
            });
        }
        require_positive("t_init", sensor.t_init)?;
    }

    for cell in &project.cells {
        require_positive("length", cell.length)?;
        require_positive("width", cell.width)?;
        if !sensor_ids.contains(&cell.sensor_id) {
            return Err(ValidationError::MissingReference {
                id: cell.sensor_id,
                context: "cell sensorID".to_string(),
            });
        }
    }

    if project.cells.len() < 2 {
        return Err(invalid(
            "cells",
            project.cells.len(),
            "at least 2 cells are required",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn valid_project() -> Project {
        Project {
            materials: vec![MaterialDef {
                d_data: DispersionDef {
                    la_data: vec![-2.22e-7, 9260.0, 0.0],
                    ta_data: vec![-2.28e-7, 5240.0, 0.0],
                    max_freq_la: 7.63e13,
                    max_freq_ta: 2.97e13,
                },
                r_data: RelaxationDef {
                    b_l: 2.0e-24,
                    b_tn: 9.3e-13,
                    b_tu: 5.5e-18,
                    b_i: 1.2e-45,
                    w: 2.42e13,
                },
            }],
            settings: SettingsDef {
                high_temp: 310.0,
                low_temp: 290.0,
                sim_time: 5.0e-8,
                time_step: None,
                num_phonons: None,
                seed: None,
            },
            sensors: vec![
                SensorDef { id: 0, t_init: 300.0 },
                SensorDef { id: 1, t_init: 300.0 },
            ],
            cells: vec![
                CellDef {
                    length: 1.0e-6,
                    width: 1.0e-7,
                    sensor_id: 0,
                },
                CellDef {
                    length: 1.0e-6,
                    width: 1.0e-7,
                    sensor_id: 1,
                },
            ],
        }
    }

    #[test]
    fn valid_project_passes() {
        validate_project(&valid_project()).unwrap();
    }

    #[test]
    fn duplicate_sensor_id_is_rejected() {
        let mut project = valid_project();
        project.sensors[1].id = 0;
        let err = validate_project(&project).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { id: 0, .. }));
    }

    #[test]
    fn unknown_sensor_reference_is_rejected() {
        let mut project = valid_project();
        project.cells[1].sensor_id = 42;
        let err = validate_project(&project).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReference { id: 42, .. }));
    }

    #[test]
    fn fewer_than_two_cells_is_rejected() {
        let mut project = valid_project();
        project.cells.truncate(1);
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn single_branch_material_is_allowed() {
        let mut project = valid_project();
        project.materials[0].d_data.ta_data.clear();
        project.materials[0].d_data.max_freq_ta = 0.0;
        validate_project(&project).unwrap();
    }

    #[test]
    fn truncated_dispersion_coefficients_are_rejected() {
        let mut project = valid_project();
        project.materials[0].d_data.la_data.truncate(2);
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn non_positive_settings_are_rejected() {
        for mutate in [
            (|p: &mut Project| p.settings.high_temp = 0.0) as fn(&mut Project),
            |p| p.settings.low_temp = -5.0,
            |p| p.settings.sim_time = 0.0,
            |p| p.settings.time_step = Some(0.0),
            |p| p.settings.num_phonons = Some(0),
            |p| p.cells[0].length = 0.0,
        ] {
            let mut project = valid_project();
            mutate(&mut project);
            assert!(validate_project(&project).is_err());
        }
    }
}
