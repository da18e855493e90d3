use core::fmt;

use crate::sequencer::{SequencerError, WriteFailure};

/// All possible errors in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I²C bus error
    I2c(E),
    /// no bus transport attached to the driver
    Init,
    /// the clear interrupt command could not be written
    Interrupt(E),
    /// block read returned too few bytes to decode a measurement
    Buffer { len: usize },
    /// a queued register write failed or was cancelled
    WriteFailed(WriteFailure),
    /// the write queue has no room for the request
    QueueFull,
    /// a batch enqueue with no writes in it
    EmptyBatch,
    /// too many tasks are waiting on write completion at once
    TooManyWaiters,
    /// block write payload longer than the device accepts
    BlockTooLong(usize),
}

impl<E> From<SequencerError> for Error<E> {
    fn from(value: SequencerError) -> Self {
        match value {
            SequencerError::QueueFull => Error::QueueFull,
            SequencerError::EmptyBatch => Error::EmptyBatch,
            SequencerError::TooManyWaiters => Error::TooManyWaiters,
            SequencerError::Write(failure) => Error::WriteFailed(failure),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C bus error: {:?}", e),
            Error::Init => f.write_str("couldn't find initialized I2C"),
            Error::Interrupt(e) => write!(f, "couldn't clear interrupt: {:?}", e),
            Error::Buffer { len } => write!(f, "incorrect data from color sensor ({} bytes)", len),
            Error::WriteFailed(failure) => write!(
                f,
                "write #{} to register {:#04x} failed: {:?}",
                failure.ticket.id(),
                failure.register,
                failure.cause
            ),
            Error::QueueFull => f.write_str("write queue full"),
            Error::EmptyBatch => f.write_str("empty write batch"),
            Error::TooManyWaiters => f.write_str("too many completion waiters"),
            Error::BlockTooLong(len) => write!(f, "block write of {} bytes too long", len),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
