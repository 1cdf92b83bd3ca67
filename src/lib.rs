//! Wearable Sensor Band Firmware Library
//!
//! This library provides the firmware core for a wrist-worn multi-sensor
//! band: independent polling tasks sample the skin thermometer, IMU,
//! pulse oximeter and electrodermal front-end, and their textual output
//! (plus the firmware's structured log stream) is delivered over a BLE
//! notification link to at most one subscribed observer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Measurement entity + line rendering                           │
//! │  - raw-register to physical-unit conversions                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - SensorPort: sample a sensor                                   │
//! │  - NotificationLink: deliver notification frames                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Streaming Core                               │
//! │  - LogStream: connection state, last-value cache, config         │
//! │  - StreamSender: capacity-sized chunking, retry, yield           │
//! │  - LinkLogSink: `log` backend with bounded queue + drop marker   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - As6221 / Lsm6dso / Max30101 / Ads1113: I2C sensors            │
//! │  - W25n01: SPI NAND flash                                        │
//! │  - GattLink (`ble` feature): trouble-host GATT server            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Properties
//!
//! - **One context, no globals** - all shared state lives in a
//!   caller-owned [`LogStream`] passed by reference to every task
//! - **Best-effort delivery** - a disconnected or slow observer never
//!   stalls a sensing duty; messages sent while unsubscribed are
//!   silently discarded
//! - **Testable** - ports allow mocking the link and the sensor buses

#![cfg_attr(not(feature = "std"), no_std)]

/// Domain layer - pure business logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Streaming core - notification transport and logging sink
pub mod stream;

/// Adapters - concrete implementations
pub mod adapters;

/// Task bodies for the polling producers
pub mod tasks;

// Re-export key domain types
pub use domain::{Measurement, SensorKind};

// Re-export port traits
pub use ports::{LinkError, NotificationLink, SensorError, SensorPort};

// Re-export the streaming core surface
pub use stream::{
    LinkLogSink, LogStream, SendError, StreamConfig, StreamSender, LAST_VALUE_CAPACITY,
};

// Re-export adapters
pub use adapters::{Ads1113, As6221, Lsm6dso, Max30101, W25n01};
#[cfg(feature = "ble")]
pub use adapters::GattLink;
