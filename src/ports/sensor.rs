//! Sensor port - abstraction for sampling sensor data
//!
//! This trait allows the polling tasks to sample without knowing the
//! specific hardware implementation (I2C register maps, mock, etc.)

use crate::domain::{Measurement, SensorKind};

/// Error type for sensor operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum SensorError {
    /// Failed to read from the sensor bus
    ReadFailed,
    /// Failed to write a configuration register
    WriteFailed,
    /// Device not found on the bus
    NotDetected,
    /// Sensor not initialized
    NotInitialized,
    /// No sample available yet (e.g. an empty FIFO)
    NotReady,
    /// Timeout waiting for the sensor
    Timeout,
}

/// Port for sampling one of the band's sensors
///
/// This trait abstracts hardware sensors so the polling loop stays
/// independent of register maps and bus types.
///
/// # Example Implementation
///
/// ```ignore
/// struct As6221<I> {
///     i2c: I,
///     address: u8,
/// }
///
/// impl<I: embedded_hal_async::i2c::I2c> SensorPort for As6221<I> {
///     async fn sample(&mut self) -> Result<Measurement, SensorError> {
///         let (celsius, raw) = self.read_celsius().await?;
///         Ok(Measurement::Temperature { celsius, raw })
///     }
///
///     fn kind(&self) -> SensorKind { SensorKind::THERMOMETER }
/// }
/// ```
pub trait SensorPort {
    /// Take a single measurement
    ///
    /// `SensorError::NotReady` means "nothing to report this cycle" and
    /// is not a fault; polling loops skip it silently.
    fn sample(&mut self)
        -> impl core::future::Future<Output = Result<Measurement, SensorError>>;

    /// Get the sensor identifier
    fn kind(&self) -> SensorKind;
}
