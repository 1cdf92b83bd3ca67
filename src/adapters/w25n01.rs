//! W25N01 SPI NAND flash driver
//!
//! Register-level driver for the Winbond W25N01GV 1 Gbit NAND, generic
//! over an `embedded-hal-async` SPI device. This peripheral is not part
//! of the notification stream; it is the band's bulk-storage part with
//! its own simple command/status protocol, exercised by the flash
//! self-check task.

use embassy_time::{Duration, Timer};
use embedded_hal_async::spi::{Operation, SpiDevice};

const CMD_RESET: u8 = 0xFF;
const CMD_WRITE_ENABLE: u8 = 0x06;
const CMD_GET_FEATURE: u8 = 0x0F;
const CMD_SET_FEATURE: u8 = 0x1F;
const CMD_BLOCK_ERASE: u8 = 0xD8;
const CMD_PROGRAM_LOAD: u8 = 0x02;
const CMD_PROGRAM_EXECUTE: u8 = 0x10;
const CMD_PAGE_READ: u8 = 0x13;
const CMD_READ_CACHE: u8 = 0x03;

const REG_STATUS: u8 = 0xC0;
const REG_PROTECTION: u8 = 0xA0;

/// Operation-in-progress
const SR_OIP: u8 = 1 << 0;
/// Erase failed
const SR_EFAIL: u8 = 1 << 2;
/// Program failed
const SR_PFAIL: u8 = 1 << 3;

/// Pages per erase block
pub const PAGES_PER_BLOCK: u32 = 64;

/// Status-poll interval while an operation is in progress
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Error type for flash operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum FlashError {
    /// SPI transfer failed
    Bus,
    /// Operation-in-progress never cleared
    Timeout,
    /// Status register reported E-FAIL
    EraseFailed,
    /// Status register reported P-FAIL
    ProgramFailed,
}

/// W25N01 NAND driver
pub struct W25n01<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> W25n01<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    async fn command(&mut self, bytes: &[u8]) -> Result<(), FlashError> {
        self.spi.write(bytes).await.map_err(|_| FlashError::Bus)
    }

    /// Device reset; the part needs a few milliseconds afterwards
    pub async fn reset(&mut self) -> Result<(), FlashError> {
        self.command(&[CMD_RESET]).await?;
        Timer::after(Duration::from_millis(5)).await;
        Ok(())
    }

    /// Clear the block-protection bits so erase/program are accepted
    pub async fn disable_protection(&mut self) -> Result<(), FlashError> {
        self.command(&[CMD_SET_FEATURE, REG_PROTECTION, 0x00])
            .await?;
        Timer::after(Duration::from_millis(2)).await;
        Ok(())
    }

    async fn write_enable(&mut self) -> Result<(), FlashError> {
        self.command(&[CMD_WRITE_ENABLE]).await
    }

    /// Read the status feature register
    pub async fn status(&mut self) -> Result<u8, FlashError> {
        let mut value = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[CMD_GET_FEATURE, REG_STATUS]),
                Operation::Read(&mut value),
            ])
            .await
            .map_err(|_| FlashError::Bus)?;
        Ok(value[0])
    }

    /// Poll status until OIP clears, returning the final status byte
    async fn wait_ready(&mut self, timeout: Duration) -> Result<u8, FlashError> {
        let mut elapsed = Duration::from_millis(0);
        loop {
            let status = self.status().await?;
            if status & SR_OIP == 0 {
                return Ok(status);
            }
            if elapsed >= timeout {
                return Err(FlashError::Timeout);
            }
            Timer::after(POLL_INTERVAL).await;
            elapsed += POLL_INTERVAL;
        }
    }

    /// Erase the 64-page block containing `page`
    pub async fn erase_block(&mut self, page: u32) -> Result<(), FlashError> {
        self.write_enable().await?;
        self.command(&[
            CMD_BLOCK_ERASE,
            (page >> 16) as u8,
            (page >> 8) as u8,
            page as u8,
        ])
        .await?;
        let status = self.wait_ready(Duration::from_secs(3)).await?;
        if status & SR_EFAIL != 0 {
            return Err(FlashError::EraseFailed);
        }
        Ok(())
    }

    /// Load `data` into the page buffer at column 0 and program `page`
    pub async fn program_page(&mut self, page: u32, data: &[u8]) -> Result<(), FlashError> {
        self.write_enable().await?;
        self.spi
            .transaction(&mut [
                Operation::Write(&[CMD_PROGRAM_LOAD, 0x00, 0x00]),
                Operation::Write(data),
            ])
            .await
            .map_err(|_| FlashError::Bus)?;
        self.command(&[
            CMD_PROGRAM_EXECUTE,
            (page >> 16) as u8,
            (page >> 8) as u8,
            page as u8,
        ])
        .await?;
        let status = self.wait_ready(Duration::from_secs(3)).await?;
        if status & SR_PFAIL != 0 {
            return Err(FlashError::ProgramFailed);
        }
        Ok(())
    }

    /// Transfer `page` from the array into the device's data buffer
    pub async fn load_page(&mut self, page: u32) -> Result<(), FlashError> {
        self.command(&[
            CMD_PAGE_READ,
            (page >> 16) as u8,
            (page >> 8) as u8,
            page as u8,
        ])
        .await?;
        self.wait_ready(Duration::from_secs(3)).await?;
        Ok(())
    }

    /// Read from the device's data buffer starting at `column`
    pub async fn read_buffer(&mut self, column: u16, out: &mut [u8]) -> Result<(), FlashError> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[CMD_READ_CACHE, (column >> 8) as u8, column as u8, 0x00]),
                Operation::Read(out),
            ])
            .await
            .map_err(|_| FlashError::Bus)
    }
}
