//! Ports (interfaces) defining the boundaries of the application
//!
//! Ports are traits that define how the streaming core interacts with
//! external systems. They allow the core to remain independent of
//! specific implementations.
//!
//! # Hexagonal Architecture
//!
//! In hexagonal architecture, ports define the "holes" in the hexagon
//! where adapters plug in:
//!
//! - **NotificationLink**: how frames reach the peer (BLE GATT, mock)
//! - **SensorPort**: how measurements are taken (I2C register maps, mock)

pub mod link;
pub mod sensor;

pub use link::{LinkError, NotificationLink};
pub use sensor::{SensorError, SensorPort};
