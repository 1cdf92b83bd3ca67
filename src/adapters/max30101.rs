//! MAX30101 pulse oximeter adapter
//!
//! This adapter implements the SensorPort trait for the Maxim MAX30101
//! optical heart-rate sensor, driven at register level over I2C in
//! multi-LED mode (red/infrared/green). Samples are pulled from the
//! part's 32-deep FIFO; an empty FIFO reports `SensorError::NotReady`.

use embassy_time::{Duration, Timer};

use crate::domain::{Measurement, SensorKind};
use crate::ports::sensor::{SensorError, SensorPort};

/// Fixed I2C address
pub const ADDRESS: u8 = 0x57;

const REG_INTR_STATUS_1: u8 = 0x00;
const REG_INTR_STATUS_2: u8 = 0x01;
const REG_INTR_ENABLE_1: u8 = 0x02;
const REG_INTR_ENABLE_2: u8 = 0x03;
const REG_FIFO_WR_PTR: u8 = 0x04;
const REG_FIFO_OVF_CNT: u8 = 0x05;
const REG_FIFO_RD_PTR: u8 = 0x06;
const REG_FIFO_DATA: u8 = 0x07;
const REG_FIFO_CONFIG: u8 = 0x08;
const REG_MODE_CONFIG: u8 = 0x09;
const REG_SPO2_CONFIG: u8 = 0x0A;
const REG_LED1_PA: u8 = 0x0C;
const REG_LED2_PA: u8 = 0x0D;
const REG_LED3_PA: u8 = 0x0E;
const REG_MULTI_LED_CTRL1: u8 = 0x11;
const REG_MULTI_LED_CTRL2: u8 = 0x12;
const REG_REV_ID: u8 = 0xFE;
const REG_PART_ID: u8 = 0xFF;

const MODE_RESET: u8 = 0x40;
/// Multi-LED mode
const MODE_MULTI_LED: u8 = 0x07;
/// No averaging, rollover enabled, almost-full at 15
const FIFO_ROLLOVER_AFULL15: u8 = 0x1F;
const SPO2_DEFAULT: u8 = 0x27;
/// Moderate LED drive current
const LED_CURRENT: u8 = 0x24;
/// Slots: S1=red, S2=infrared, S3=green, S4=none
const SLOTS_1_2: u8 = 0x21;
const SLOTS_3_4: u8 = 0x03;

/// One FIFO frame: three 18-bit samples, 3 bytes each
const FRAME_LEN: usize = 9;

fn sample18(b: &[u8]) -> u32 {
    (((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32) & 0x3FFFF
}

/// MAX30101 pulse sensor adapter
pub struct Max30101<I> {
    i2c: I,
    ready: bool,
}

impl<I: embedded_hal_async::i2c::I2c> Max30101<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, ready: false }
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[reg], &mut value)
            .await
            .map_err(|_| SensorError::ReadFailed)?;
        Ok(value[0])
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(ADDRESS, &[reg, value])
            .await
            .map_err(|_| SensorError::WriteFailed)
    }

    /// Part and revision IDs, for bring-up diagnostics
    pub async fn part_id(&mut self) -> Result<(u8, u8), SensorError> {
        Ok((
            self.read_reg(REG_PART_ID).await?,
            self.read_reg(REG_REV_ID).await?,
        ))
    }

    /// Soft-reset and poll until the reset bit clears (up to ~500 ms)
    async fn reset(&mut self) -> Result<(), SensorError> {
        self.write_reg(REG_MODE_CONFIG, MODE_RESET).await?;
        for _ in 0..50 {
            if self.read_reg(REG_MODE_CONFIG).await? & MODE_RESET == 0 {
                return Ok(());
            }
            Timer::after(Duration::from_millis(10)).await;
        }
        Err(SensorError::Timeout)
    }

    /// Reset and apply the multi-LED configuration
    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.reset().await?;

        self.write_reg(REG_INTR_ENABLE_1, 0x00).await?;
        self.write_reg(REG_INTR_ENABLE_2, 0x00).await?;
        self.write_reg(REG_FIFO_CONFIG, FIFO_ROLLOVER_AFULL15).await?;
        self.write_reg(REG_MODE_CONFIG, MODE_MULTI_LED).await?;
        self.write_reg(REG_SPO2_CONFIG, SPO2_DEFAULT).await?;
        self.write_reg(REG_LED1_PA, LED_CURRENT).await?;
        self.write_reg(REG_LED2_PA, LED_CURRENT).await?;
        self.write_reg(REG_LED3_PA, LED_CURRENT).await?;
        self.write_reg(REG_MULTI_LED_CTRL1, SLOTS_1_2).await?;
        self.write_reg(REG_MULTI_LED_CTRL2, SLOTS_3_4).await?;

        // Clear FIFO pointers and latched status
        self.write_reg(REG_FIFO_WR_PTR, 0x00).await?;
        self.write_reg(REG_FIFO_OVF_CNT, 0x00).await?;
        self.write_reg(REG_FIFO_RD_PTR, 0x00).await?;
        let _ = self.read_reg(REG_INTR_STATUS_1).await?;
        let _ = self.read_reg(REG_INTR_STATUS_2).await?;

        self.ready = true;
        Ok(())
    }

    /// Samples waiting in the FIFO
    async fn fifo_pending(&mut self) -> Result<u8, SensorError> {
        let wr = self.read_reg(REG_FIFO_WR_PTR).await?;
        let rd = self.read_reg(REG_FIFO_RD_PTR).await?;
        Ok(wr.wrapping_sub(rd) & 0x1F)
    }
}

impl<I: embedded_hal_async::i2c::I2c> SensorPort for Max30101<I> {
    async fn sample(&mut self) -> Result<Measurement, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }

        let pending = self.fifo_pending().await?;
        if pending == 0 {
            return Err(SensorError::NotReady);
        }

        let mut frame = [0u8; FRAME_LEN];
        self.i2c
            .write_read(ADDRESS, &[REG_FIFO_DATA], &mut frame)
            .await
            .map_err(|_| SensorError::ReadFailed)?;

        Ok(Measurement::Pulse {
            red: sample18(&frame[0..3]),
            ir: sample18(&frame[3..6]),
            green: sample18(&frame[6..9]),
            pending,
        })
    }

    fn kind(&self) -> SensorKind {
        SensorKind::PULSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testbus::MockI2c;

    #[test]
    fn test_sample18_masks_to_18_bits() {
        assert_eq!(sample18(&[0xFF, 0xFF, 0xFF]), 0x3FFFF);
        assert_eq!(sample18(&[0x01, 0x02, 0x03]), 0x10203);
    }

    #[tokio::test]
    async fn test_empty_fifo_is_not_ready() {
        // wr == rd
        let bus = MockI2c::with_reads(&[&[0x05], &[0x05]]);
        let mut ppg = Max30101::new(bus);
        ppg.ready = true;
        assert_eq!(ppg.sample().await, Err(SensorError::NotReady));
    }

    #[tokio::test]
    async fn test_sample_parses_frame() {
        let bus = MockI2c::with_reads(&[
            &[0x07], // wr
            &[0x04], // rd -> 3 pending
            &[0x00, 0x10, 0x00, 0x00, 0x20, 0x00, 0x00, 0x30, 0x00],
        ]);
        let mut ppg = Max30101::new(bus);
        ppg.ready = true;
        assert_eq!(
            ppg.sample().await,
            Ok(Measurement::Pulse {
                red: 0x1000,
                ir: 0x2000,
                green: 0x3000,
                pending: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_fifo_pointer_wraparound() {
        let bus = MockI2c::with_reads(&[
            &[0x02], // wr wrapped past rd
            &[0x1E],
            &[0; 9],
        ]);
        let mut ppg = Max30101::new(bus);
        ppg.ready = true;
        match ppg.sample().await.unwrap() {
            Measurement::Pulse { pending, .. } => assert_eq!(pending, 4),
            other => panic!("unexpected measurement {:?}", other),
        }
    }
}
