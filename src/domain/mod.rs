//! Domain layer - pure business logic independent of infrastructure
//!
//! This module contains the measurement entities and unit conversions
//! shared by every sensor adapter and polling task.

pub mod measurement;
pub mod units;

pub use measurement::{Measurement, SensorKind, MAX_LINE_LEN};
