//! Paced register write queue.
//!
//! Configuration writes are pushed onto a bounded FIFO and executed by a single
//! worker, [`CommandSequencer::run`], one at a time. After each write the worker
//! waits the write's settling delay before taking the next item, so the device
//! always sees the programmed spacing no matter how many producers enqueue or
//! when they do it.
//!
//! Every enqueued write gets a [`WriteTicket`]. Waiting on the ticket resolves
//! once the write and its delay have completed and reports whether it failed.

use core::cell::RefCell;

use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_sync::watch::Watch;
use embedded_hal::i2c::{Error as _, ErrorKind};
use embedded_hal_async::delay::DelayNs;
use heapless::{Deque, Vec};
use log::{debug, warn};

use crate::bus::Bus;
use crate::constants::MAX_BLOCK_LEN;
use crate::error::Error;
use crate::transport::Transport;

// concurrent `wait`/`wait_batch` callers
const WAITERS: usize = 4;

/// register write carried by a queue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Register { register: u8, value: u8 },
    Block { register: u8, data: Vec<u8, MAX_BLOCK_LEN> },
}

impl WriteOp {
    pub fn register(&self) -> u8 {
        match self {
            WriteOp::Register { register, .. } | WriteOp::Block { register, .. } => *register,
        }
    }
}

/// id of an enqueued write, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteTicket(u64);

impl WriteTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// contiguous run of tickets enqueued together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBatch {
    pub first: WriteTicket,
    pub last: WriteTicket,
}

impl WriteBatch {
    pub fn len(&self) -> usize {
        (self.last.0 - self.first.0 + 1) as usize
    }

    pub fn contains(&self, ticket: WriteTicket) -> bool {
        self.first <= ticket && ticket <= self.last
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub ticket: WriteTicket,
    pub op: WriteOp,
    /// settling time after the write, ms
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Bus(ErrorKind),
    /// no transport attached when the write ran
    Detached,
    /// removed from the queue before it ran
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFailure {
    pub ticket: WriteTicket,
    pub register: u8,
    pub cause: FailureCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    QueueFull,
    /// `enqueue_batch` called with no writes
    EmptyBatch,
    TooManyWaiters,
    Write(WriteFailure),
}

/// a batch together with the first failure recorded in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedBatch {
    pub batch: WriteBatch,
    pub failure: Option<WriteFailure>,
}

impl TrackedBatch {
    fn note(&mut self, failure: &WriteFailure) {
        if self.failure.is_none() && self.batch.contains(failure.ticket) {
            self.failure = Some(*failure);
        }
    }
}

struct Progress<const Q: usize> {
    next_ticket: u64,
    /// tickets below this have completed
    completed: u64,
    running: bool,
    in_flight: bool,
    cancel_requested: bool,
    /// most recent failures, oldest dropped first
    failures: Deque<WriteFailure, Q>,
    /// keeps its first failure however many writes fail afterwards
    pinned: Option<TrackedBatch>,
    /// one slot per task blocked in `wait_batch`
    waiting: [Option<TrackedBatch>; WAITERS],
}

impl<const Q: usize> Progress<Q> {
    const fn new() -> Self {
        Self {
            next_ticket: 0,
            completed: 0,
            running: false,
            in_flight: false,
            cancel_requested: false,
            failures: Deque::new(),
            pinned: None,
            waiting: [None; WAITERS],
        }
    }

    fn record(&mut self, failure: Option<WriteFailure>) {
        if let Some(failure) = failure {
            if let Some(pinned) = self.pinned.as_mut() {
                pinned.note(&failure);
            }
            for slot in self.waiting.iter_mut().flatten() {
                slot.note(&failure);
            }
            if self.failures.is_full() {
                self.failures.pop_front();
            }
            let _ = self.failures.push_back(failure);
        }
        self.completed += 1;
    }

    fn track(&self, batch: WriteBatch) -> TrackedBatch {
        TrackedBatch { batch, failure: self.failure_in(batch.first, batch.last) }
    }

    fn failure_in(&self, first: WriteTicket, last: WriteTicket) -> Option<WriteFailure> {
        self.failures
            .iter()
            .find(|f| first <= f.ticket && f.ticket <= last)
            .copied()
    }
}

/// FIFO of register writes with a settling delay after each, drained by [`run`](Self::run).
pub struct CommandSequencer<M: RawMutex, const Q: usize> {
    queue: Channel<M, PendingWrite, Q>,
    progress: BlockingMutex<M, RefCell<Progress<Q>>>,
    completions: Watch<M, u64, WAITERS>,
    shutdown: Signal<M, ()>,
}

impl<M: RawMutex, const Q: usize> Default for CommandSequencer<M, Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const Q: usize> CommandSequencer<M, Q> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            progress: BlockingMutex::new(RefCell::new(Progress::new())),
            completions: Watch::new(),
            shutdown: Signal::new(),
        }
    }

    /// Append a write to the tail of the queue. It runs once every write enqueued
    /// before it has run and waited out its delay.
    pub fn enqueue(&self, op: WriteOp, delay_ms: u32) -> Result<WriteTicket, SequencerError> {
        self.progress.lock(|p| {
            let mut p = p.borrow_mut();
            let ticket = WriteTicket(p.next_ticket);
            let register = op.register();
            match self.queue.try_send(PendingWrite { ticket, op, delay_ms }) {
                Ok(()) => {
                    p.next_ticket += 1;
                    debug!("queued write #{} to {:#04x}, {} ms", ticket.0, register, delay_ms);
                    Ok(ticket)
                }
                Err(_) => Err(SequencerError::QueueFull),
            }
        })
    }

    /// Enqueue all writes or none of them.
    pub fn enqueue_batch<const N: usize>(&self, writes: [(WriteOp, u32); N]) -> Result<WriteBatch, SequencerError> {
        if N == 0 {
            return Err(SequencerError::EmptyBatch);
        }
        if self.free_slots() < N {
            return Err(SequencerError::QueueFull);
        }
        // single cooperative context, nothing can take the free slots in between
        let mut first = None;
        let mut last = WriteTicket(0);
        for (op, delay_ms) in writes {
            last = self.enqueue(op, delay_ms)?;
            if first.is_none() {
                first = Some(last);
            }
        }
        Ok(WriteBatch { first: first.unwrap_or(last), last })
    }

    /// writes waiting in the queue, not counting one in flight
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn free_slots(&self) -> usize {
        Q - self.queue.len()
    }

    /// true while any submitted write has not completed
    pub fn is_busy(&self) -> bool {
        self.progress.lock(|p| {
            let p = p.borrow();
            p.completed != p.next_ticket
        })
    }

    pub fn is_complete(&self, ticket: WriteTicket) -> bool {
        self.progress.lock(|p| ticket.0 < p.borrow().completed)
    }

    /// true while a [`run`](Self::run) loop is draining the queue
    pub fn is_running(&self) -> bool {
        self.progress.lock(|p| p.borrow().running)
    }

    /// Keep the first failure of `batch` until another batch is pinned, independent of
    /// how many failures are recorded in between.
    pub fn pin(&self, batch: WriteBatch) {
        self.progress.lock(|p| {
            let mut p = p.borrow_mut();
            let tracked = p.track(batch);
            p.pinned = Some(tracked);
        });
    }

    pub fn pinned(&self) -> Option<TrackedBatch> {
        self.progress.lock(|p| p.borrow().pinned)
    }

    /// Resolves once `ticket` has completed. A failure recorded before the call is
    /// reported while it is still among the last `Q` recorded; one recorded while
    /// waiting is always reported.
    pub async fn wait(&self, ticket: WriteTicket) -> Result<(), SequencerError> {
        self.wait_batch(WriteBatch { first: ticket, last: ticket }).await
    }

    /// Resolves once the whole batch has completed, returning the first failure in it.
    pub async fn wait_batch(&self, batch: WriteBatch) -> Result<(), SequencerError> {
        let mut rx = self.completions.receiver().ok_or(SequencerError::TooManyWaiters)?;
        let slot = WaitSlot::claim(self, batch).ok_or(SequencerError::TooManyWaiters)?;
        while !self.is_complete(batch.last) {
            rx.changed().await;
        }
        match slot.failure() {
            Some(failure) => Err(SequencerError::Write(failure)),
            None => Ok(()),
        }
    }

    /// Resolves once `ticket` has completed, without looking at failures. Never fails:
    /// with every completion receiver taken it falls back to yielding.
    pub async fn wait_drained(&self, ticket: WriteTicket) {
        match self.completions.receiver() {
            Some(mut rx) => {
                while !self.is_complete(ticket) {
                    rx.changed().await;
                }
            }
            None => {
                while !self.is_complete(ticket) {
                    yield_now().await;
                }
            }
        }
    }

    /// Drop every write that has not started yet, completing each as cancelled in queue
    /// order. A write already on the bus finishes first, including its delay.
    pub fn cancel_pending(&self) {
        let completed = self.progress.lock(|p| {
            let mut p = p.borrow_mut();
            if p.in_flight {
                p.cancel_requested = true;
                None
            } else {
                self.drain_cancelled(&mut p);
                Some(p.completed)
            }
        });
        if let Some(completed) = completed {
            self.completions.sender().send(completed);
        }
    }

    /// cancel pending writes and stop [`run`](Self::run)
    pub fn shutdown(&self) {
        self.cancel_pending();
        self.shutdown.signal(());
    }

    fn drain_cancelled(&self, p: &mut Progress<Q>) {
        while let Ok(write) = self.queue.try_receive() {
            warn!("cancelled write #{} to {:#04x}", write.ticket.0, write.op.register());
            p.record(Some(WriteFailure {
                ticket: write.ticket,
                register: write.op.register(),
                cause: FailureCause::Cancelled,
            }));
        }
    }

    /// Worker loop: take the head write, perform it on `bus`, wait its delay, repeat.
    /// The bus mutex is held only for the write itself. Returns after [`shutdown`](Self::shutdown).
    /// Only one loop drains the queue: while one is active, further calls log a warning
    /// and return at once.
    pub async fn run<T: Transport, D: DelayNs>(&self, bus: &Mutex<M, Bus<T>>, mut delay: D) {
        let Some(_running) = RunGuard::acquire(self) else {
            warn!("sequencer already running");
            return;
        };
        self.shutdown.reset();
        debug!("sequencer running");
        loop {
            let write = match select(self.shutdown.wait(), self.queue.receive()).await {
                Either::First(()) => {
                    debug!("sequencer stopped");
                    return;
                }
                Either::Second(write) => write,
            };
            self.progress.lock(|p| p.borrow_mut().in_flight = true);

            let result = bus.lock().await.apply(&write.op).await;
            let failure = result.err().map(|e| {
                let cause = match e {
                    Error::Init => FailureCause::Detached,
                    Error::I2c(e) | Error::Interrupt(e) => FailureCause::Bus(e.kind()),
                    _ => FailureCause::Bus(ErrorKind::Other),
                };
                warn!("write #{} to {:#04x} failed: {:?}", write.ticket.0, write.op.register(), cause);
                WriteFailure { ticket: write.ticket, register: write.op.register(), cause }
            });

            delay.delay_ms(write.delay_ms).await;

            let completed = self.progress.lock(|p| {
                let mut p = p.borrow_mut();
                p.in_flight = false;
                p.record(failure);
                if p.cancel_requested {
                    p.cancel_requested = false;
                    self.drain_cancelled(&mut p);
                }
                p.completed
            });
            self.completions.sender().send(completed);
        }
    }
}

// marks the queue as drained by one loop, released when `run` returns or is dropped
struct RunGuard<'a, M: RawMutex, const Q: usize> {
    sequencer: &'a CommandSequencer<M, Q>,
}

impl<'a, M: RawMutex, const Q: usize> RunGuard<'a, M, Q> {
    fn acquire(sequencer: &'a CommandSequencer<M, Q>) -> Option<Self> {
        sequencer.progress.lock(|p| {
            let mut p = p.borrow_mut();
            if p.running {
                return None;
            }
            p.running = true;
            Some(Self { sequencer })
        })
    }
}

impl<M: RawMutex, const Q: usize> Drop for RunGuard<'_, M, Q> {
    fn drop(&mut self) {
        let sequencer = self.sequencer;
        let completed = sequencer.progress.lock(|p| {
            let mut p = p.borrow_mut();
            p.running = false;
            // dropped mid-write, a deferred cancel has nobody left to run it
            p.in_flight = false;
            if p.cancel_requested {
                p.cancel_requested = false;
                sequencer.drain_cancelled(&mut p);
            }
            p.completed
        });
        sequencer.completions.sender().send(completed);
    }
}

// failure slot of one `wait_batch` caller
struct WaitSlot<'a, M: RawMutex, const Q: usize> {
    sequencer: &'a CommandSequencer<M, Q>,
    index: usize,
}

impl<'a, M: RawMutex, const Q: usize> WaitSlot<'a, M, Q> {
    fn claim(sequencer: &'a CommandSequencer<M, Q>, batch: WriteBatch) -> Option<Self> {
        sequencer.progress.lock(|p| {
            let mut p = p.borrow_mut();
            let index = p.waiting.iter().position(Option::is_none)?;
            let tracked = p.track(batch);
            p.waiting[index] = Some(tracked);
            Some(Self { sequencer, index })
        })
    }

    fn failure(&self) -> Option<WriteFailure> {
        self.sequencer
            .progress
            .lock(|p| p.borrow().waiting[self.index].and_then(|slot| slot.failure))
    }
}

impl<M: RawMutex, const Q: usize> Drop for WaitSlot<'_, M, Q> {
    fn drop(&mut self) {
        self.sequencer.progress.lock(|p| p.borrow_mut().waiting[self.index] = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, Harness};
    use embassy_futures::{block_on, join::{join, join3}};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Sequencer = CommandSequencer<NoopRawMutex, 8>;

    fn reg(register: u8, value: u8) -> WriteOp {
        WriteOp::Register { register, value }
    }

    #[test]
    fn runs_writes_in_order_spaced_by_their_delay() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport(), 0x39));
        let sequencer = Sequencer::new();

        let delays = [100, 5, 0, 42, 7];
        let mut last = None;
        for (i, d) in delays.iter().enumerate() {
            last = Some(sequencer.enqueue(reg(0x80 + i as u8, i as u8), *d).unwrap());
        }
        assert_eq!(sequencer.pending(), 5);
        assert!(sequencer.is_busy());

        block_on(join(sequencer.run(&bus, harness.delay()), async {
            sequencer.wait(last.unwrap()).await.unwrap();
            sequencer.shutdown();
        }));

        let writes = harness.timed_writes();
        assert_eq!(writes.len(), 5);
        for (i, (_, bytes)) in writes.iter().enumerate() {
            assert_eq!(bytes, &vec![0x80 + i as u8, i as u8]);
        }
        for i in 1..writes.len() {
            assert!(writes[i].0 - writes[i - 1].0 >= u64::from(delays[i - 1]));
        }
        assert_eq!(harness.now(), delays.iter().map(|d| u64::from(*d)).sum::<u64>());
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn never_overlaps_a_write_with_the_previous_delay() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport(), 0x39));
        let sequencer = Sequencer::new();
        let first = sequencer.enqueue(reg(0x81, 1), 10).unwrap();

        block_on(join(sequencer.run(&bus, harness.delay()), async {
            sequencer.wait(first).await.unwrap();
            // enqueued after the first batch drained
            let second = sequencer.enqueue(reg(0x82, 2), 10).unwrap();
            let third = sequencer.enqueue(reg(0x83, 3), 10).unwrap();
            assert!(second < third);
            sequencer.wait(third).await.unwrap();
            sequencer.shutdown();
        }));

        // strict alternation: write, delay, write, delay, ...
        let events: std::vec::Vec<Event> = harness
            .events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Address(_)))
            .collect();
        assert_eq!(
            events,
            vec![
                Event::Write(vec![0x81, 1]),
                Event::Delay(10),
                Event::Write(vec![0x82, 2]),
                Event::Delay(10),
                Event::Write(vec![0x83, 3]),
                Event::Delay(10),
            ]
        );
    }

    #[test]
    fn failed_write_is_reported_and_queue_continues() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport().failing_register(0x82), 0x39));
        let sequencer = Sequencer::new();
        let batch = sequencer
            .enqueue_batch([(reg(0x81, 1), 1), (reg(0x82, 2), 1), (reg(0x83, 3), 1)])
            .unwrap();
        assert_eq!(batch.len(), 3);

        let (_, result) = block_on(join(sequencer.run(&bus, harness.delay()), async {
            let result = sequencer.wait_batch(batch).await;
            sequencer.shutdown();
            result
        }));

        match result {
            Err(SequencerError::Write(failure)) => {
                assert_eq!(failure.register, 0x82);
                assert_eq!(failure.ticket, WriteTicket(1));
                assert!(matches!(failure.cause, FailureCause::Bus(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(harness.register_writes(), vec![(0x81, 1), (0x83, 3)]);
        assert_eq!(block_on(sequencer.wait(WriteTicket(2))), Ok(()));
    }

    #[test]
    fn cancel_completes_pending_writes_in_order() {
        let sequencer = Sequencer::new();
        let a = sequencer.enqueue(reg(0x81, 1), 100).unwrap();
        let b = sequencer.enqueue(reg(0x82, 2), 100).unwrap();
        sequencer.cancel_pending();

        assert_eq!(sequencer.pending(), 0);
        assert!(!sequencer.is_busy());
        let err = block_on(sequencer.wait(b)).unwrap_err();
        assert_eq!(
            err,
            SequencerError::Write(WriteFailure { ticket: b, register: 0x82, cause: FailureCause::Cancelled })
        );
        assert!(matches!(block_on(sequencer.wait(a)), Err(SequencerError::Write(f)) if f.ticket == a));
    }

    #[test]
    fn shutdown_lets_the_running_write_finish() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport(), 0x39));
        let sequencer = Sequencer::new();
        let a = sequencer.enqueue(reg(0x81, 1), 50).unwrap();
        let b = sequencer.enqueue(reg(0x82, 2), 50).unwrap();

        block_on(join(sequencer.run(&bus, harness.delay()), async {
            // first poll of run has taken `a` off the queue
            sequencer.shutdown();
        }));

        assert_eq!(harness.register_writes(), vec![(0x81, 1)]);
        assert_eq!(block_on(sequencer.wait(a)), Ok(()));
        assert!(matches!(
            block_on(sequencer.wait(b)),
            Err(SequencerError::Write(WriteFailure { cause: FailureCause::Cancelled, .. }))
        ));
    }

    #[test]
    fn second_run_returns_while_one_is_draining() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport(), 0x39));
        let sequencer = Sequencer::new();
        sequencer.enqueue(reg(0x81, 1), 10).unwrap();
        sequencer.enqueue(reg(0x82, 2), 10).unwrap();
        let last = sequencer.enqueue(reg(0x83, 3), 10).unwrap();

        block_on(join3(sequencer.run(&bus, harness.delay()), sequencer.run(&bus, harness.delay()), async {
            assert!(sequencer.is_running());
            sequencer.wait(last).await.unwrap();
            sequencer.shutdown();
        }));

        assert!(!sequencer.is_running());
        let times: std::vec::Vec<u64> = harness.timed_writes().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0, 10, 20]);
        assert_eq!(harness.now(), 30);
    }

    #[test]
    fn waiter_keeps_its_failure_when_a_cancel_floods_the_log() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport().failing_register(0x87), 0x39));
        let sequencer = Sequencer::new();
        let batch = sequencer
            .enqueue_batch([
                (reg(0x87, 0), 10),
                (reg(0x81, 1), 10),
                (reg(0x81, 2), 10),
                (reg(0x81, 3), 10),
                (reg(0x81, 4), 10),
                (reg(0x81, 5), 10),
                (reg(0x81, 6), 10),
                (reg(0x81, 7), 10),
            ])
            .unwrap();

        let (_, (result, _)) = block_on(join(
            sequencer.run(&bus, harness.delay()),
            join(sequencer.wait_batch(batch), async {
                // first write is on the bus, refill the queue then cancel all of it
                sequencer.enqueue(reg(0x82, 0), 10).unwrap();
                assert_eq!(sequencer.free_slots(), 0);
                sequencer.shutdown();
            }),
        ));

        match result {
            Err(SequencerError::Write(failure)) => {
                assert_eq!(failure.ticket, batch.first);
                assert_eq!(failure.register, 0x87);
                assert!(matches!(failure.cause, FailureCause::Bus(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pinned_batch_keeps_first_failure() {
        let harness = Harness::new();
        let bus = Mutex::<NoopRawMutex, _>::new(Bus::new(harness.transport().failing_register(0x87), 0x39));
        let sequencer = Sequencer::new();
        let batch = sequencer.enqueue_batch([(reg(0x81, 0), 0), (reg(0x87, 0), 0)]).unwrap();
        sequencer.pin(batch);
        for _ in 0..6 {
            sequencer.enqueue(reg(0x87, 0), 0).unwrap();
        }
        block_on(join(sequencer.run(&bus, harness.delay()), async {
            sequencer.wait_drained(WriteTicket(7)).await;
            for _ in 0..8 {
                sequencer.enqueue(reg(0x87, 0), 0).unwrap();
            }
            sequencer.wait_drained(WriteTicket(15)).await;
            sequencer.shutdown();
        }));

        let pinned = sequencer.pinned().unwrap();
        assert_eq!(pinned.batch, batch);
        assert_eq!(pinned.failure.map(|f| f.ticket), Some(WriteTicket(1)));
        // the shared log has moved on
        assert!(matches!(block_on(sequencer.wait(WriteTicket(1))), Ok(())));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let sequencer = Sequencer::new();
        assert_eq!(sequencer.enqueue_batch::<0>([]), Err(SequencerError::EmptyBatch));
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn full_queue_rejects_without_partial_batches() {
        let sequencer = CommandSequencer::<NoopRawMutex, 4>::new();
        sequencer.enqueue(reg(0x81, 0), 0).unwrap();
        sequencer.enqueue(reg(0x81, 0), 0).unwrap();
        let result = sequencer.enqueue_batch([(reg(0x81, 0), 0), (reg(0x82, 0), 0), (reg(0x83, 0), 0)]);
        assert_eq!(result, Err(SequencerError::QueueFull));
        assert_eq!(sequencer.pending(), 2);
        sequencer.enqueue(reg(0x81, 0), 0).unwrap();
        sequencer.enqueue(reg(0x81, 0), 0).unwrap();
        assert_eq!(sequencer.enqueue(reg(0x81, 0), 0), Err(SequencerError::QueueFull));
    }
}
