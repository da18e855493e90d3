// Fake transport and virtual clock shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embassy_futures::yield_now;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_async::delay::DelayNs;

use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Address(u8),
    Write(Vec<u8>),
    Read(usize),
    Delay(u32),
}

/// event log plus a millisecond clock advanced only by [`FakeDelay`]
#[derive(Clone, Default)]
pub(crate) struct Harness {
    log: Rc<RefCell<Vec<(u64, Event)>>>,
    clock: Rc<Cell<u64>>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub(crate) fn transport(&self) -> FakeTransport {
        FakeTransport {
            harness: self.clone(),
            read_data: Vec::new(),
            fail_register: None,
            fail_writes: false,
        }
    }

    pub(crate) fn delay(&self) -> FakeDelay {
        FakeDelay { harness: self.clone() }
    }

    fn push(&self, event: Event) {
        self.log.borrow_mut().push((self.clock.get(), event));
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.log.borrow().iter().map(|(_, e)| e.clone()).collect()
    }

    /// every multi-byte write with the time it was issued
    pub(crate) fn timed_writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|(t, e)| match e {
                Event::Write(bytes) if bytes.len() > 1 => Some((*t, bytes.clone())),
                _ => None,
            })
            .collect()
    }

    /// (register, value) pairs of single register writes, in bus order
    pub(crate) fn register_writes(&self) -> Vec<(u8, u8)> {
        self.timed_writes()
            .into_iter()
            .filter(|(_, bytes)| bytes.len() == 2)
            .map(|(_, bytes)| (bytes[0], bytes[1]))
            .collect()
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.get()
    }
}

pub(crate) struct FakeTransport {
    harness: Harness,
    /// bytes answered to the next reads, truncated to the buffer length
    pub(crate) read_data: Vec<u8>,
    /// writes whose first byte is this register fail
    pub(crate) fail_register: Option<u8>,
    pub(crate) fail_writes: bool,
}

impl FakeTransport {
    pub(crate) fn with_read_data(mut self, data: &[u8]) -> Self {
        self.read_data = data.to_vec();
        self
    }

    pub(crate) fn failing_register(mut self, register: u8) -> Self {
        self.fail_register = Some(register);
        self
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn check(&self, bytes: &[u8]) -> Result<(), ErrorKind> {
        if self.fail_writes || (self.fail_register.is_some() && bytes.first().copied() == self.fail_register) {
            return Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Data));
        }
        Ok(())
    }
}

impl Transport for FakeTransport {
    type Error = ErrorKind;

    async fn set_address(&mut self, address: u8) -> Result<(), Self::Error> {
        self.harness.push(Event::Address(address));
        Ok(())
    }

    async fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.check(&[byte])?;
        self.harness.push(Event::Write(vec![byte]));
        Ok(())
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check(bytes)?;
        self.harness.push(Event::Write(bytes.to_vec()));
        Ok(())
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let len = buffer.len().min(self.read_data.len());
        buffer[..len].copy_from_slice(&self.read_data[..len]);
        self.harness.push(Event::Read(len));
        Ok(len)
    }
}

/// advances the virtual clock and yields once so other futures get polled
pub(crate) struct FakeDelay {
    harness: Harness,
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let ms = u64::from(ns) / 1_000_000;
        self.harness.clock.set(self.harness.clock.get() + ms);
        yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.harness.push(Event::Delay(ms));
        self.harness.clock.set(self.harness.clock.get() + u64::from(ms));
        yield_now().await;
    }
}
