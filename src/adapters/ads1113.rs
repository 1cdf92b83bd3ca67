//! ADS1113 electrodermal activity front-end adapter
//!
//! This adapter implements the SensorPort trait for the TI ADS1113
//! 16-bit ADC sampling the skin-conductance electrodes. Besides the
//! voltage itself it tracks sample-to-sample deltas to flag a flat
//! signal (a disconnected or dried-out electrode).

use crate::domain::units::adc_raw_to_millivolts;
use crate::domain::{Measurement, SensorKind};
use crate::ports::sensor::{SensorError, SensorPort};

/// Default I2C address (ADDR tied to VDD)
pub const DEFAULT_ADDRESS: u8 = 0x49;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// Continuous conversion, 128 SPS
const CONFIG_CONTINUOUS: [u8; 2] = [0xC2, 0x83];

/// Raw delta at or below which a sample counts as flat
const FLAT_DELTA_RAW: i16 = 1;

/// Consecutive flat samples before the flatline flag raises
/// (5 seconds at the 4 Hz sampling cadence)
pub const FLAT_SAMPLE_LIMIT: u16 = 20;

/// ADS1113 EDA adapter
pub struct Ads1113<I> {
    i2c: I,
    address: u8,
    prev_raw: Option<i16>,
    flat_count: u16,
    ready: bool,
}

impl<I: embedded_hal_async::i2c::I2c> Ads1113<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            prev_raw: None,
            flat_count: 0,
            ready: false,
        }
    }

    /// Put the converter in continuous mode
    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(
                self.address,
                &[REG_CONFIG, CONFIG_CONTINUOUS[0], CONFIG_CONTINUOUS[1]],
            )
            .await
            .map_err(|_| SensorError::WriteFailed)?;
        self.ready = true;
        Ok(())
    }

    async fn read_raw(&mut self) -> Result<i16, SensorError> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONVERSION], &mut data)
            .await
            .map_err(|_| SensorError::ReadFailed)?;
        Ok(((data[0] as u16) << 8 | data[1] as u16) as i16)
    }
}

impl<I: embedded_hal_async::i2c::I2c> SensorPort for Ads1113<I> {
    async fn sample(&mut self) -> Result<Measurement, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }

        let raw = self.read_raw().await?;
        let delta = match self.prev_raw {
            Some(prev) => raw.wrapping_sub(prev),
            None => 0,
        };
        if self.prev_raw.is_some() && delta.abs() <= FLAT_DELTA_RAW {
            self.flat_count = self.flat_count.saturating_add(1);
        } else {
            self.flat_count = 0;
        }
        self.prev_raw = Some(raw);

        Ok(Measurement::Electrodermal {
            raw,
            millivolts: adc_raw_to_millivolts(raw),
            delta,
            flatline: self.flat_count >= FLAT_SAMPLE_LIMIT,
        })
    }

    fn kind(&self) -> SensorKind {
        SensorKind::ELECTRODERMAL
    }
}
