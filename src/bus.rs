//! The bus handle and the register level primitives built on it.
//!
//! These are the only functions that touch a [`Transport`]. The driver keeps its
//! [`Bus`] behind a single async mutex so queued writes, reads and interrupt
//! clears never interleave on the wire.

use log::debug;

use crate::constants::MAX_BLOCK_LEN;
use crate::error::Error;
use crate::sequencer::WriteOp;
use crate::transport::Transport;

/// Transport handle plus the device address every transaction is sent to.
pub struct Bus<T> {
    transport: Option<T>,
    address: u8,
}

impl<T> Bus<T> {
    pub const fn new(transport: T, address: u8) -> Self {
        Self { transport: Some(transport), address }
    }

    /// a bus with no transport yet, every transaction fails with [`Error::Init`]
    pub const fn unattached(address: u8) -> Self {
        Self { transport: None, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// install a transport, returning the previous one
    pub fn attach(&mut self, transport: T) -> Option<T> {
        self.transport.replace(transport)
    }

    pub fn detach(&mut self) -> Option<T> {
        self.transport.take()
    }

    pub fn into_transport(self) -> Option<T> {
        self.transport
    }
}

impl<T: Transport> Bus<T> {
    // address the device, handing back the transport
    async fn select(&mut self) -> Result<&mut T, Error<T::Error>> {
        let address = self.address;
        let transport = self.transport.as_mut().ok_or(Error::Init)?;
        transport.set_address(address).await.map_err(Error::I2c)?;
        Ok(transport)
    }

    /// send `register` as command byte, then read `buffer.len()` bytes.
    /// Returns the number of bytes actually received.
    pub async fn read_register_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<usize, Error<T::Error>> {
        self.select().await?.write_byte(register).await.map_err(Error::I2c)?;
        let len = self.select().await?.read_bytes(buffer).await.map_err(Error::I2c)?;
        debug!("read {} of {} bytes from {:#04x}", len, buffer.len(), register);
        Ok(len)
    }

    /// write `data` to consecutive registers starting at `register`, one transaction
    pub async fn write_register_block(&mut self, register: u8, data: &[u8]) -> Result<(), Error<T::Error>> {
        if data.len() > MAX_BLOCK_LEN {
            return Err(Error::BlockTooLong(data.len()));
        }
        let mut frame = [0u8; MAX_BLOCK_LEN + 1];
        frame[0] = register;
        frame[1..=data.len()].copy_from_slice(data);
        debug!("write block {:#04x} <- {:02x?}", register, data);
        self.select().await?.write_bytes(&frame[..=data.len()]).await.map_err(Error::I2c)
    }

    pub async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<T::Error>> {
        debug!("write {:#04x} <- {:#04x}", register, value);
        self.select().await?.write_bytes(&[register, value]).await.map_err(Error::I2c)
    }

    /// single command byte with no payload, e.g. CLR_INT
    pub async fn write_command(&mut self, command: u8) -> Result<(), Error<T::Error>> {
        debug!("command {:#04x}", command);
        self.select().await?.write_byte(command).await.map_err(Error::I2c)
    }

    /// perform a queued write
    pub async fn apply(&mut self, op: &WriteOp) -> Result<(), Error<T::Error>> {
        match op {
            WriteOp::Register { register, value } => self.write_register(*register, *value).await,
            WriteOp::Block { register, data } => self.write_register_block(*register, data).await,
        }
    }
}
