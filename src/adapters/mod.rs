//! Adapters - concrete implementations of ports
//!
//! Adapters connect the streaming core to the outside world by
//! implementing the port traits. The sensor and flash adapters are
//! generic over `embedded-hal-async` buses, so they carry no HAL
//! dependency of their own; the BLE adapter binds the notification
//! link to a `trouble-host` GATT server.
//!
//! # Available Adapters
//!
//! - **as6221**: AS6221 skin thermometer via I2C
//! - **lsm6dso**: LSM6DSO accelerometer + gyroscope via I2C
//! - **max30101**: MAX30101 pulse oximeter via I2C
//! - **ads1113**: ADS1113 electrodermal ADC via I2C
//! - **w25n01**: W25N01 NAND flash via SPI
//! - **ble** (`ble` feature): trouble-host GATT notification link

pub mod ads1113;
pub mod as6221;
#[cfg(feature = "ble")]
pub mod ble;
pub mod lsm6dso;
pub mod max30101;
pub mod w25n01;

#[cfg(test)]
pub(crate) mod testbus;

pub use ads1113::Ads1113;
pub use as6221::As6221;
#[cfg(feature = "ble")]
pub use ble::GattLink;
pub use lsm6dso::Lsm6dso;
pub use max30101::Max30101;
pub use w25n01::{FlashError, W25n01};
