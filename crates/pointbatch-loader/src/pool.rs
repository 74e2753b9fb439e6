//! The collate worker pool.
//!
//! Workers receive [`Task`]s over a bounded crossbeam channel, assemble
//! them, and send a [`Completed`] back over an unbounded channel, so a
//! worker never blocks on the consumer. The pool reorders completions by
//! ticket before handing them out.
//!
//! A panic while assembling a task is caught on the worker and delivered
//! as [`TaskError::Panicked`] for that ticket, so `recv` never waits on a
//! result that will not come.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use pointbatch_assemble::{AssembleError, Assembled, AssemblerConfig, BatchAssembler};
use pointbatch_core::Value;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::config::{PoolConfig, PoolError, TaskError};

/// Submission-order identifier of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// A finished batch.
#[derive(Debug)]
pub struct Completed {
    /// The ticket returned by [`CollatePool::submit`].
    pub ticket: Ticket,
    /// The assembled batch, or why it could not be assembled.
    pub result: Result<Assembled, TaskError>,
}

/// Work run by a worker for one task.
type AssembleFn = fn(&AssemblerConfig, u64, &[Value]) -> Result<Assembled, AssembleError>;

/// A raw batch dispatched to a worker.
struct Task {
    ticket: u64,
    samples: Vec<Value>,
}

/// A fixed set of threads assembling batches in parallel.
///
/// Dropping the pool closes the queue and joins the workers.
pub struct CollatePool {
    task_tx: Option<Sender<Task>>,
    done_rx: Receiver<Completed>,
    workers: Vec<JoinHandle<()>>,
    next_ticket: u64,
    next_delivery: u64,
    pending: BTreeMap<u64, Completed>,
}

impl CollatePool {
    /// Validate `config` and spawn the workers.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Self::spawn(config, assemble_task)
    }

    fn spawn(config: PoolConfig, job: AssembleFn) -> Result<Self, PoolError> {
        config.validate()?;
        let worker_count = config.resolved_worker_count();
        let (task_tx, task_rx) = crossbeam_channel::bounded::<Task>(config.queue_depth);
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let task_rx = task_rx.clone();
            let done_tx = done_tx.clone();
            let assembler = config.assembler.clone();
            let handle = thread::Builder::new()
                .name(format!("pointbatch-worker-{index}"))
                .spawn(move || worker_loop(index, task_rx, done_tx, assembler, job))
                .map_err(|e| PoolError::ThreadSpawnFailed {
                    reason: e.to_string(),
                })?;
            workers.push(handle);
        }

        Ok(Self {
            task_tx: Some(task_tx),
            done_rx,
            workers,
            next_ticket: 0,
            next_delivery: 0,
            pending: BTreeMap::new(),
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Batches submitted but not yet returned by [`recv`](Self::recv).
    pub fn in_flight(&self) -> usize {
        (self.next_ticket - self.next_delivery) as usize
    }

    /// Queue one raw batch. Blocks while the task queue is full.
    pub fn submit(&mut self, samples: Vec<Value>) -> Result<Ticket, PoolError> {
        let tx = self.task_tx.as_ref().ok_or(PoolError::ShutDown)?;
        let ticket = self.next_ticket;
        tx.send(Task { ticket, samples })
            .map_err(|_| PoolError::ShutDown)?;
        self.next_ticket += 1;
        trace!(ticket, "batch submitted");
        Ok(Ticket(ticket))
    }

    /// Block until the oldest in-flight batch is finished and return it.
    pub fn recv(&mut self) -> Result<Completed, PoolError> {
        if self.in_flight() == 0 {
            return Err(PoolError::NothingPending);
        }
        loop {
            if let Some(done) = self.pending.remove(&self.next_delivery) {
                self.next_delivery += 1;
                return Ok(done);
            }
            let done = self.done_rx.recv().map_err(|_| PoolError::WorkersLost)?;
            self.pending.insert(done.ticket.0, done);
        }
    }

    /// Close the queue and join every worker.
    ///
    /// Batches still in flight are discarded.
    pub fn shutdown(mut self) -> Result<(), PoolError> {
        match self.close() {
            0 => Ok(()),
            count => Err(PoolError::WorkerPanicked { count }),
        }
    }

    /// Returns the number of workers that panicked.
    fn close(&mut self) -> usize {
        self.task_tx.take();
        self.workers
            .drain(..)
            .map(JoinHandle::join)
            .filter(Result::is_err)
            .count()
    }
}

impl Drop for CollatePool {
    fn drop(&mut self) {
        self.close();
    }
}

/// Assemble one task with an RNG seeded from its ticket.
fn assemble_task(
    config: &AssemblerConfig,
    ticket: u64,
    samples: &[Value],
) -> Result<Assembled, AssembleError> {
    let rng = ChaCha8Rng::seed_from_u64(config.seed ^ ticket);
    BatchAssembler::with_rng(config.clone(), rng)?.assemble(samples)
}

fn worker_loop(
    index: usize,
    task_rx: Receiver<Task>,
    done_tx: Sender<Completed>,
    config: AssemblerConfig,
    job: AssembleFn,
) {
    debug!(worker = index, "collate worker started");
    while let Ok(task) = task_rx.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            job(&config, task.ticket, &task.samples)
        }));
        let result = match outcome {
            Ok(assembled) => assembled.map_err(TaskError::from),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(worker = index, ticket = task.ticket, %message, "assembly panicked");
                Err(TaskError::Panicked { message })
            }
        };
        let done = Completed {
            ticket: Ticket(task.ticket),
            result,
        };
        if done_tx.send(done).is_err() {
            break;
        }
    }
    // Queue closed or pool dropped.
    debug!(worker = index, "collate worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointbatch_test_utils::record_values;

    fn config(workers: usize) -> PoolConfig {
        PoolConfig {
            worker_count: Some(workers),
            ..Default::default()
        }
    }

    /// Panics on ticket 0, assembles normally otherwise.
    fn panic_on_first(
        config: &AssemblerConfig,
        ticket: u64,
        samples: &[Value],
    ) -> Result<Assembled, AssembleError> {
        if ticket == 0 {
            panic!("assembly blew up");
        }
        assemble_task(config, ticket, samples)
    }

    #[test]
    fn panicking_task_is_delivered_as_an_error() {
        let mut pool = CollatePool::spawn(config(2), panic_on_first).unwrap();
        pool.submit(record_values(&[2, 3], 0)).unwrap();
        pool.submit(record_values(&[4, 1], 1)).unwrap();

        let first = pool.recv().unwrap();
        assert_eq!(first.ticket, Ticket(0));
        assert_eq!(
            first.result.unwrap_err(),
            TaskError::Panicked {
                message: "assembly blew up".into()
            }
        );
        assert!(pool.recv().unwrap().result.is_ok());
        assert_eq!(pool.shutdown(), Ok(()));
    }

    #[test]
    fn worker_keeps_running_after_a_panic() {
        let mut pool = CollatePool::spawn(config(1), panic_on_first).unwrap();
        for seed in 0..3 {
            pool.submit(record_values(&[2, 2], seed)).unwrap();
        }
        assert!(pool.recv().unwrap().result.is_err());
        assert!(pool.recv().unwrap().result.is_ok());
        assert!(pool.recv().unwrap().result.is_ok());
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn submit_after_close_is_shut_down() {
        let mut pool = CollatePool::new(config(1)).unwrap();
        assert_eq!(pool.close(), 0);
        assert_eq!(
            pool.submit(record_values(&[1], 0)).unwrap_err(),
            PoolError::ShutDown
        );
    }

    #[test]
    fn undelivered_ticket_after_workers_exit_is_lost() {
        let mut pool = CollatePool::new(config(2)).unwrap();
        pool.close();
        // A ticket was handed out but no worker is left to finish it.
        pool.next_ticket += 1;
        assert_eq!(pool.recv().unwrap_err(), PoolError::WorkersLost);
    }

    #[test]
    fn shutdown_counts_panicked_workers() {
        let mut pool = CollatePool::new(config(2)).unwrap();
        pool.workers.push(thread::spawn(|| panic!("worker died")));
        assert_eq!(
            pool.shutdown().unwrap_err(),
            PoolError::WorkerPanicked { count: 1 }
        );
    }

    #[test]
    fn panic_payloads_become_messages() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let number: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(number.as_ref()), "non-string panic payload");
    }
}
