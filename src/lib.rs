#![cfg_attr(not(test), no_std)]

//! Async driver for the TCS3414CS digital RGB color sensor.
//!
//! Configuration registers need a settling delay after each write, so the driver
//! never writes them inline. [`Tcs3414::initialize`] queues the five configuration
//! writes on a [`CommandSequencer`](sequencer::CommandSequencer) and returns at once;
//! the writes happen while [`Tcs3414::run`] is being polled, which the application
//! joins with its own code or spawns as a task:
//!
//! ```ignore
//! let sensor: Tcs3414<NoopRawMutex, _> = Tcs3414::new(I2cTransport::new(i2c));
//! sensor.initialize()?;
//! join(sensor.run(delay), async {
//!     loop {
//!         let rgb = sensor.read_color().await?;  // waits for the configuration to drain
//!         info!("{:?}", rgb);
//!         Timer::after_millis(500).await;
//!     }
//! }).await;
//! ```
//!
//! Every bus transaction, queued or not, goes through one async mutex, so a
//! `read_color` or `clear_interrupt` can never land between the address and data
//! phases of a queued write.

pub mod bus;
pub mod constants;
pub mod data;
pub mod error;
pub mod sequencer;
pub mod transport;

#[cfg(test)]
mod testing;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::bus::Bus;
use crate::constants::{
    DeviceAddress, BLOCK_READ_LEN, CLR_INT, CTL_DAT_INITIATE, INIT_SETTLE_MS, REG_BLOCK_READ,
    REG_CTL, REG_GAIN, REG_ID, REG_INT, REG_INT_SOURCE, REG_LOW_THRESH_LOW_BYTE, REG_TIMING,
};
use crate::data::{
    Control, GainReg, InterruptControl, Measurements, PartId, RegisterSnapshot,
    Tcs3414Configuration, Timing,
};
use crate::error::Error;
use crate::sequencer::{CommandSequencer, TrackedBatch, WriteBatch, WriteOp, WriteTicket};
use crate::transport::Transport;

/// default write queue capacity, room for three initialization sequences
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Where the driver is in its configuration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// `initialize` has not been called
    Uninitialized,
    /// configuration writes are queued or draining
    Initializing,
    /// the latest configuration sequence has drained, failed writes included
    Ready,
}

/// the TCS3414CS device
///
/// The latest initialization batch is pinned on the sequencer, which keeps its first
/// failed write for [`wait_ready`](Self::wait_ready).
pub struct Tcs3414<M: RawMutex, T, const Q: usize = DEFAULT_QUEUE_DEPTH> {
    bus: Mutex<M, Bus<T>>,
    sequencer: CommandSequencer<M, Q>,
}

impl<M: RawMutex, T, const Q: usize> Tcs3414<M, T, Q> {
    /// create new driver talking to the default device address 0x39
    pub const fn new(transport: T) -> Self {
        Self::new_with_address(transport, DeviceAddress::Default as u8)
    }

    pub const fn new_with_address(transport: T, address: u8) -> Self {
        Self::with_bus(Bus::new(transport, address))
    }

    /// driver with no bus handle yet; bus operations fail with [`Error::Init`] until [`attach`](Self::attach)
    pub const fn unattached() -> Self {
        Self::with_bus(Bus::unattached(DeviceAddress::Default as u8))
    }

    const fn with_bus(bus: Bus<T>) -> Self {
        Self {
            bus: Mutex::new(bus),
            sequencer: CommandSequencer::new(),
        }
    }

    /// open the bus handle, returning the one it replaces
    pub async fn attach(&self, transport: T) -> Option<T> {
        debug!("attach transport");
        self.bus.lock().await.attach(transport)
    }

    /// close the bus handle; queued writes that run afterwards fail as detached
    pub async fn detach(&self) -> Option<T> {
        debug!("detach transport");
        self.bus.lock().await.detach()
    }

    /// give back the transport
    pub fn release(self) -> Option<T> {
        self.bus.into_inner().into_transport()
    }

    pub fn sequencer(&self) -> &CommandSequencer<M, Q> {
        &self.sequencer
    }

    pub fn state(&self) -> DriverState {
        match self.sequencer.pinned() {
            None => DriverState::Uninitialized,
            Some(init) if self.sequencer.is_complete(init.batch.last) => DriverState::Ready,
            Some(_) => DriverState::Initializing,
        }
    }

    /// cancel queued writes and stop [`run`](Self::run) once the write on the bus, if any, has settled
    pub fn shutdown(&self) {
        info!("shutdown, {} queued writes dropped", self.sequencer.pending());
        self.sequencer.shutdown();
    }
}

impl<M: RawMutex, T: Transport, const Q: usize> Tcs3414<M, T, Q> {
    /// Drain the write queue until [`shutdown`](Self::shutdown). Must be polled for
    /// `initialize` and other queued writes to take effect.
    pub async fn run<D: DelayNs>(&self, delay: D) {
        self.sequencer.run(&self.bus, delay).await
    }

    /// queue the default configuration, see [`Tcs3414Configuration::default`]
    pub fn initialize(&self) -> Result<WriteBatch, Error<T::Error>> {
        self.initialize_with(Tcs3414Configuration::DEFAULT)
    }

    /// Queue the five configuration writes: timing, interrupt source, interrupt control,
    /// gain, then the ADC start command last so conversion begins fully configured.
    /// Returns as soon as they are queued.
    pub fn initialize_with(&self, config: Tcs3414Configuration) -> Result<WriteBatch, Error<T::Error>> {
        let settle = config.settle_ms;
        let batch = self.sequencer.enqueue_batch([
            (WriteOp::Register { register: REG_TIMING, value: config.timing_byte() }, settle),
            (WriteOp::Register { register: REG_INT_SOURCE, value: config.interrupt_source_byte() }, settle),
            (WriteOp::Register { register: REG_INT, value: config.interrupt_control_byte() }, settle),
            (WriteOp::Register { register: REG_GAIN, value: config.gain_byte() }, settle),
            (WriteOp::Register { register: REG_CTL, value: CTL_DAT_INITIATE }, settle),
        ])?;
        self.sequencer.pin(batch);
        info!("initializing, writes #{}..#{} queued", batch.first.id(), batch.last.id());
        Ok(batch)
    }

    /// Resolve once the latest initialization has drained. Reports the first failed
    /// configuration write, or [`Error::Init`] if `initialize` was never called.
    pub async fn wait_ready(&self) -> Result<(), Error<T::Error>> {
        let init = self.drain_initialization().await.ok_or(Error::Init)?;
        match init.failure {
            Some(failure) => Err(Error::WriteFailed(failure)),
            None => {
                debug!("ready");
                Ok(())
            }
        }
    }

    // wait until the latest initialization batch has drained, following re-initializations
    async fn drain_initialization(&self) -> Option<TrackedBatch> {
        loop {
            let init = self.sequencer.pinned()?;
            self.sequencer.wait_drained(init.batch.last).await;
            let latest = self.sequencer.pinned()?;
            if latest.batch == init.batch {
                return Some(latest);
            }
        }
    }

    /// queue a single register write with its settling delay
    pub fn enqueue_write(&self, register: u8, value: u8, delay_ms: u32) -> Result<WriteTicket, Error<T::Error>> {
        Ok(self.sequencer.enqueue(WriteOp::Register { register, value }, delay_ms)?)
    }

    /// Queue the interrupt thresholds, one block write starting at the low threshold.
    pub fn set_interrupt_thresholds(&self, low: u16, high: u16) -> Result<WriteTicket, Error<T::Error>> {
        let [low_lo, low_hi] = low.to_le_bytes();
        let [high_lo, high_hi] = high.to_le_bytes();
        let data = heapless::Vec::from_slice(&[low_lo, low_hi, high_lo, high_hi])
            .map_err(|_| Error::BlockTooLong(4))?;
        debug!("thresholds low {} high {}", low, high);
        Ok(self
            .sequencer
            .enqueue(WriteOp::Block { register: REG_LOW_THRESH_LOW_BYTE, data }, INIT_SETTLE_MS)?)
    }

    /// Read green, red, blue and clear counts in one block read.
    /// Waits for a pending initialization to drain first. A failed configuration write
    /// is only logged here, [`wait_ready`](Self::wait_ready) reports it. Before any
    /// `initialize` the ADC may not be running and the counts are whatever the device holds.
    pub async fn read_color(&self) -> Result<Measurements, Error<T::Error>> {
        match self.state() {
            DriverState::Initializing => {
                if let Some(TrackedBatch { failure: Some(failure), .. }) = self.drain_initialization().await {
                    warn!(
                        "configuration write #{} to {:#04x} failed ({:?}), reading anyway",
                        failure.ticket.id(),
                        failure.register,
                        failure.cause
                    );
                }
            }
            DriverState::Uninitialized => warn!("read_color before initialize, data may be stale"),
            DriverState::Ready => {}
        }
        let mut buffer = [0u8; BLOCK_READ_LEN];
        let len = self.read_register_block(REG_BLOCK_READ, &mut buffer).await?;
        let measurements = Measurements::decode(&buffer[..len]).ok_or(Error::Buffer { len })?;
        debug!("read_color {:?}", measurements);
        Ok(measurements)
    }

    /// Acknowledge a pending interrupt. Written immediately, not queued.
    pub async fn clear_interrupt(&self) -> Result<(), Error<T::Error>> {
        debug!("clear_interrupt");
        match self.bus.lock().await.write_command(CLR_INT).await {
            Err(Error::I2c(e)) => Err(Error::Interrupt(e)),
            other => other,
        }
    }

    pub async fn read_id(&self) -> Result<PartId, Error<T::Error>> {
        Ok(PartId::from(self.read_byte(REG_ID).await?))
    }

    /// CTL register, `get_adc_valid()` tells whether an integration cycle has completed
    pub async fn read_control(&self) -> Result<Control, Error<T::Error>> {
        Ok(Control(self.read_byte(REG_CTL).await?))
    }

    /// read back the configuration registers
    pub async fn read_configuration(&self) -> Result<RegisterSnapshot, Error<T::Error>> {
        Ok(RegisterSnapshot {
            control: Control(self.read_byte(REG_CTL).await?),
            timing: Timing(self.read_byte(REG_TIMING).await?),
            interrupt_control: InterruptControl(self.read_byte(REG_INT).await?),
            interrupt_source: self.read_byte(REG_INT_SOURCE).await?,
            gain: GainReg(self.read_byte(REG_GAIN).await?),
        })
    }

    async fn read_byte(&self, register: u8) -> Result<u8, Error<T::Error>> {
        let mut buffer = [0u8; 1];
        let len = self.read_register_block(register, &mut buffer).await?;
        if len < 1 {
            return Err(Error::Buffer { len });
        }
        Ok(buffer[0])
    }

    /// direct block read, serialized with queued writes
    pub async fn read_register_block(&self, register: u8, buffer: &mut [u8]) -> Result<usize, Error<T::Error>> {
        self.bus.lock().await.read_register_block(register, buffer).await
    }

    /// direct block write, not paced by the queue
    pub async fn write_register_block(&self, register: u8, data: &[u8]) -> Result<(), Error<T::Error>> {
        self.bus.lock().await.write_register_block(register, data).await
    }

    /// direct register write, not paced by the queue
    pub async fn write_register(&self, register: u8, value: u8) -> Result<(), Error<T::Error>> {
        self.bus.lock().await.write_register(register, value).await
    }
}
