//! Scripted bus doubles for adapter tests

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

/// Mock I2C bus: records writes, answers reads from a queue.
pub(crate) struct MockI2c {
    /// Data returned per read operation, front-first; missing entries
    /// read as zeros.
    pub reads: RefCell<VecDeque<Vec<u8>>>,
    /// `(address, bytes)` per write operation, in order.
    pub writes: RefCell<Vec<(u8, Vec<u8>)>>,
}

impl MockI2c {
    pub(crate) fn new() -> Self {
        Self {
            reads: RefCell::new(VecDeque::new()),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_reads(reads: &[&[u8]]) -> Self {
        let bus = Self::new();
        bus.reads
            .borrow_mut()
            .extend(reads.iter().map(|r| r.to_vec()));
        bus
    }
}

impl embedded_hal_async::i2c::ErrorType for MockI2c {
    type Error = Infallible;
}

impl embedded_hal_async::i2c::I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [embedded_hal_async::i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                embedded_hal_async::i2c::Operation::Write(bytes) => {
                    self.writes.borrow_mut().push((address, bytes.to_vec()));
                }
                embedded_hal_async::i2c::Operation::Read(buf) => {
                    let data = self.reads.borrow_mut().pop_front().unwrap_or_default();
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                }
            }
        }
        Ok(())
    }
}

/// Mock SPI device: records write operations, answers reads from a
/// queue.
pub(crate) struct MockSpi {
    pub reads: RefCell<VecDeque<Vec<u8>>>,
    pub writes: RefCell<Vec<Vec<u8>>>,
}

impl MockSpi {
    pub(crate) fn new() -> Self {
        Self {
            reads: RefCell::new(VecDeque::new()),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_reads(reads: &[&[u8]]) -> Self {
        let bus = Self::new();
        bus.reads
            .borrow_mut()
            .extend(reads.iter().map(|r| r.to_vec()));
        bus
    }

    fn fill(&self, buf: &mut [u8]) {
        let data = self.reads.borrow_mut().pop_front().unwrap_or_default();
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
    }
}

impl embedded_hal_async::spi::ErrorType for MockSpi {
    type Error = Infallible;
}

impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(
        &mut self,
        operations: &mut [embedded_hal_async::spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                embedded_hal_async::spi::Operation::Write(bytes) => {
                    self.writes.borrow_mut().push(bytes.to_vec());
                }
                embedded_hal_async::spi::Operation::Read(buf) => self.fill(buf),
                embedded_hal_async::spi::Operation::Transfer(read, write) => {
                    self.writes.borrow_mut().push(write.to_vec());
                    self.fill(read);
                }
                embedded_hal_async::spi::Operation::TransferInPlace(buf) => {
                    self.writes.borrow_mut().push(buf.to_vec());
                    self.fill(buf);
                }
                embedded_hal_async::spi::Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}
