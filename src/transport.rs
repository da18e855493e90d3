//! Bus transport capability.
//!
//! The driver never talks to an I²C peripheral directly; it goes through
//! [`Transport`], which mirrors the primitive operations of a Linux style
//! i2c channel: select the target address, then write or read raw bytes.
//! Adapters are provided for `embedded-hal-async` and blocking `embedded-hal`
//! buses.

use core::future::Future;

use embedded_hal::i2c::{Error as I2cError, I2c as BlockingI2c};
use embedded_hal_async::i2c::I2c as AsyncI2c;

/// Byte level access to one bus channel.
pub trait Transport {
    type Error: I2cError;

    /// select the 7-bit address following transactions go to
    fn set_address(&mut self, address: u8) -> impl Future<Output = Result<(), Self::Error>>;

    fn write_byte(&mut self, byte: u8) -> impl Future<Output = Result<(), Self::Error>>;

    /// write `bytes` in a single transaction
    fn write_bytes(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;

    /// read up to `buffer.len()` bytes, returning how many were received
    fn read_bytes(&mut self, buffer: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>>;
}

/// [`Transport`] over an async embedded-hal I²C bus
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: AsyncI2c> I2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, address: 0 }
    }

    /// give back the I2C interface
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: AsyncI2c> Transport for I2cTransport<I2C> {
    type Error = I2C::Error;

    async fn set_address(&mut self, address: u8) -> Result<(), Self::Error> {
        self.address = address;
        Ok(())
    }

    async fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[byte]).await
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, bytes).await
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.read(self.address, buffer).await?;
        Ok(buffer.len())
    }
}

/// [`Transport`] over a blocking embedded-hal I²C bus, e.g. `linux-embedded-hal`'s `I2cdev`.
/// The returned futures are ready on first poll; the bus is busy-waited.
pub struct BlockingI2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: BlockingI2c> BlockingI2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, address: 0 }
    }

    /// give back the I2C interface
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: BlockingI2c> Transport for BlockingI2cTransport<I2C> {
    type Error = I2C::Error;

    async fn set_address(&mut self, address: u8) -> Result<(), Self::Error> {
        self.address = address;
        Ok(())
    }

    async fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[byte])
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, bytes)
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.read(self.address, buffer)?;
        Ok(buffer.len())
    }
}
