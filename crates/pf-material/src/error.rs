//! Error types for material construction and evaluation.

use thiserror::Error;

pub type MaterialResult<T> = Result<T, MaterialError>;

#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Invalid dispersion data: {what}")]
    InvalidDispersion { what: &'static str },

    #[error("Invalid relaxation data: {what}")]
    InvalidRelaxation { what: &'static str },

    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },
}
