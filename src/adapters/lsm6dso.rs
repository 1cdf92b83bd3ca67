//! LSM6DSO inertial measurement unit adapter
//!
//! This adapter implements the SensorPort trait for the ST LSM6DSO
//! accelerometer + gyroscope over I2C. The part answers on 0x6A or
//! 0x6B depending on the SDO strap, so bring-up probes both.

use crate::domain::units::{accel_raw_to_mg, gyro_raw_to_mdps, le16};
use crate::domain::{Measurement, SensorKind};
use crate::ports::sensor::{SensorError, SensorPort};

const ADDR_PRIMARY: u8 = 0x6A;
const ADDR_SECONDARY: u8 = 0x6B;

const REG_WHO_AM_I: u8 = 0x0F;
const WHO_AM_I_VAL: u8 = 0x6C;

const REG_CTRL1_XL: u8 = 0x10;
const REG_CTRL2_G: u8 = 0x11;
const REG_CTRL3_C: u8 = 0x12;

/// Burst start; reads gyro then accel, 12 bytes total
const REG_OUTX_L_G: u8 = 0x22;

/// Accelerometer 104 Hz, +/-2 g
const CTRL1_XL_104HZ_2G: u8 = 0x40;
/// Gyroscope 104 Hz, +/-250 dps
const CTRL2_G_104HZ_250DPS: u8 = 0x40;
/// Block data update + register auto-increment
const CTRL3_C_BDU_IFINC: u8 = 0x44;

/// LSM6DSO IMU adapter
///
/// Call [`init`](Self::init) before sampling; it probes the address,
/// then configures both sense chains.
pub struct Lsm6dso<I> {
    i2c: I,
    address: u8,
    ready: bool,
}

impl<I: embedded_hal_async::i2c::I2c> Lsm6dso<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: ADDR_PRIMARY,
            ready: false,
        }
    }

    /// The detected I2C address (meaningful after `init`)
    pub fn address(&self) -> u8 {
        self.address
    }

    async fn read_reg(&mut self, address: u8, reg: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(address, &[reg], &mut value)
            .await
            .map_err(|_| SensorError::ReadFailed)?;
        Ok(value[0])
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .await
            .map_err(|_| SensorError::WriteFailed)
    }

    /// Probe WHO_AM_I at both strap addresses
    async fn detect(&mut self) -> Result<(), SensorError> {
        for address in [ADDR_PRIMARY, ADDR_SECONDARY] {
            if let Ok(WHO_AM_I_VAL) = self.read_reg(address, REG_WHO_AM_I).await {
                self.address = address;
                return Ok(());
            }
        }
        Err(SensorError::NotDetected)
    }

    /// Detect the device and configure both sense chains
    /// (XL 104 Hz / 2 g, G 104 Hz / 250 dps, BDU + IF_INC)
    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.detect().await?;
        self.write_reg(REG_CTRL3_C, CTRL3_C_BDU_IFINC).await?;
        self.write_reg(REG_CTRL1_XL, CTRL1_XL_104HZ_2G).await?;
        self.write_reg(REG_CTRL2_G, CTRL2_G_104HZ_250DPS).await?;
        self.ready = true;
        Ok(())
    }
}

impl<I: embedded_hal_async::i2c::I2c> SensorPort for Lsm6dso<I> {
    async fn sample(&mut self) -> Result<Measurement, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }

        let mut buf = [0u8; 12];
        self.i2c
            .write_read(self.address, &[REG_OUTX_L_G], &mut buf)
            .await
            .map_err(|_| SensorError::ReadFailed)?;

        let gyro_raw = [
            le16(buf[0], buf[1]),
            le16(buf[2], buf[3]),
            le16(buf[4], buf[5]),
        ];
        let accel_raw = [
            le16(buf[6], buf[7]),
            le16(buf[8], buf[9]),
            le16(buf[10], buf[11]),
        ];

        Ok(Measurement::Inertial {
            accel_mg: accel_raw.map(accel_raw_to_mg),
            gyro_mdps: gyro_raw.map(gyro_raw_to_mdps),
            accel_raw,
            gyro_raw,
        })
    }

    fn kind(&self) -> SensorKind {
        SensorKind::INERTIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testbus::MockI2c;

    #[tokio::test]
    async fn test_init_probes_secondary_address() {
        // Primary address answers garbage, secondary answers WHO_AM_I.
        let bus = MockI2c::with_reads(&[&[0x00], &[WHO_AM_I_VAL]]);
        let mut imu = Lsm6dso::new(bus);
        imu.init().await.unwrap();
        assert_eq!(imu.address(), ADDR_SECONDARY);

        let writes = imu.i2c.writes.borrow();
        assert_eq!(writes[2], (ADDR_SECONDARY, vec![REG_CTRL3_C, 0x44]));
        assert_eq!(writes[3], (ADDR_SECONDARY, vec![REG_CTRL1_XL, 0x40]));
        assert_eq!(writes[4], (ADDR_SECONDARY, vec![REG_CTRL2_G, 0x40]));
    }

    #[tokio::test]
    async fn test_sample_requires_init() {
        let mut imu = Lsm6dso::new(MockI2c::new());
        assert_eq!(imu.sample().await, Err(SensorError::NotInitialized));
    }

    #[tokio::test]
    async fn test_sample_decodes_gyro_then_accel() {
        let bus = MockI2c::with_reads(&[
            &[WHO_AM_I_VAL],
            // gx=100 gy=0 gz=-100, ax=1000 ay=0 az=-1000
            &[100, 0, 0, 0, 156, 255, 232, 3, 0, 0, 24, 252],
        ]);
        let mut imu = Lsm6dso::new(bus);
        imu.init().await.unwrap();

        match imu.sample().await.unwrap() {
            Measurement::Inertial {
                gyro_raw,
                accel_raw,
                gyro_mdps,
                accel_mg,
            } => {
                assert_eq!(gyro_raw, [100, 0, -100]);
                assert_eq!(accel_raw, [1000, 0, -1000]);
                assert_eq!(gyro_mdps, [875, 0, -875]);
                assert_eq!(accel_mg, [61, 0, -61]);
            }
            other => panic!("unexpected measurement {:?}", other),
        }
    }
}
