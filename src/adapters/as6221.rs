//! AS6221 digital thermometer adapter
//!
//! This adapter implements the SensorPort trait for the AMS AS6221
//! skin-temperature sensor over I2C.

use crate::domain::units::temp_raw_to_celsius;
use crate::domain::{Measurement, SensorKind};
use crate::ports::sensor::{SensorError, SensorPort};

/// Default I2C address (ADD0 tied low)
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Temperature register (16-bit, MSB first)
const REG_TEMP: u8 = 0x00;

/// AS6221 thermometer adapter
pub struct As6221<I> {
    i2c: I,
    address: u8,
}

impl<I: embedded_hal_async::i2c::I2c> As6221<I> {
    /// Create an adapter at the default address
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create an adapter at an explicit address (ADD0 strapping)
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Read the raw 16-bit temperature register
    pub async fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_TEMP], &mut data)
            .await
            .map_err(|_| SensorError::ReadFailed)?;
        Ok(((data[0] as u16) << 8) | data[1] as u16)
    }

    /// Read the temperature in Celsius, with the raw register value
    pub async fn read_celsius(&mut self) -> Result<(f32, u16), SensorError> {
        let raw = self.read_raw().await?;
        Ok((temp_raw_to_celsius(raw), raw))
    }
}

impl<I: embedded_hal_async::i2c::I2c> SensorPort for As6221<I> {
    async fn sample(&mut self) -> Result<Measurement, SensorError> {
        let (celsius, raw) = self.read_celsius().await?;
        Ok(Measurement::Temperature { celsius, raw })
    }

    fn kind(&self) -> SensorKind {
        SensorKind::THERMOMETER
    }
}
