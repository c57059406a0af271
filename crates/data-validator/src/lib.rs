//! Input Validation and Coercion
//!
//! Turns loosely-typed caller input (JSON bodies, form fields) into strict
//! optional numbers before anything reaches the store.

mod coerce;
mod error;
mod input;

pub use coerce::{optional_number, require_non_empty};
pub use error::ValidationError;
pub use input::{SensorInput, SensorValues, SENSOR_FIELDS};
