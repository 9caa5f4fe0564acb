//! Serial task queue that orders and executes recording work.
//!
//! One dedicated worker thread pulls tasks off a crossbeam channel and runs
//! them one at a time, in submission order. Submitting never blocks the
//! caller. [`Dispatcher::block_on_queue`] pushes a flush barrier and waits for
//! the worker to reach it, which is how test introspection gets
//! read-after-write consistency.

use crate::core::{DispatcherConfig, GleanError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Task(BoxedTask),
    Flush(Sender<()>),
    Shutdown,
}

/// Counters describing the work seen by a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Tasks accepted into the queue
    pub launched: u64,
    /// Tasks that finished running (including ones that panicked)
    pub executed: u64,
    /// Tasks rejected because the queue was full or shut down
    pub dropped: u64,
    /// Tasks that panicked while running
    pub panicked: u64,
}

#[derive(Debug, Default)]
struct Counters {
    launched: AtomicU64,
    executed: AtomicU64,
    dropped: AtomicU64,
    panicked: AtomicU64,
}

/// Single-worker FIFO dispatcher.
pub struct Dispatcher {
    sender: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    shutdown: AtomicBool,
    counters: Arc<Counters>,
}

impl Dispatcher {
    /// Spawn the worker thread and return a dispatcher feeding it.
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let counters = Arc::new(Counters::default());

        let worker_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || Self::run_worker(&receiver, &worker_counters))
            .map_err(|e| GleanError::config(format!("Failed to spawn dispatcher thread: {}", e)))?;

        debug!(thread = %config.thread_name, capacity = ?config.queue_capacity, "Dispatcher started");

        Ok(Self {
            sender,
            worker_id: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
            shutdown: AtomicBool::new(false),
            counters,
        })
    }

    fn run_worker(receiver: &Receiver<Command>, counters: &Counters) {
        while let Ok(command) = receiver.recv() {
            match command {
                Command::Task(task) => {
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        counters.panicked.fetch_add(1, Ordering::Relaxed);
                        error!("Dispatcher task panicked; continuing with the next task");
                    }
                    counters.executed.fetch_add(1, Ordering::Relaxed);
                },
                Command::Flush(done) => {
                    // The waiter may have given up; nothing to do then.
                    let _ = done.send(());
                },
                Command::Shutdown => break,
            }
        }
        debug!("Dispatcher worker exiting");
    }

    /// Queue a task for execution on the worker thread.
    ///
    /// Returns immediately. Tasks are dropped (and counted) when the queue is
    /// full or the dispatcher has been shut down.
    pub fn launch<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shutdown.load(Ordering::Acquire) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("Dispatcher is shut down; dropping task");
            return;
        }

        match self.sender.try_send(Command::Task(Box::new(task))) {
            Ok(()) => {
                self.counters.launched.fetch_add(1, Ordering::Relaxed);
            },
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Dispatcher queue is full; dropping task");
            },
            Err(TrySendError::Disconnected(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Dispatcher worker is gone; dropping task");
            },
        }
    }

    /// Block until every task queued before this call has run.
    ///
    /// Must not be called from a dispatcher task: the worker would wait on itself.
    pub fn block_on_queue(&self) -> Result<()> {
        if self.is_worker_thread() {
            return Err(GleanError::DrainFromDispatcher);
        }
        if self.shutdown.load(Ordering::Acquire) {
            // Shutdown already drained the queue.
            return Ok(());
        }

        let (done_tx, done_rx) = bounded(1);
        // Blocking send: the barrier must not be dropped on a full bounded queue.
        self.sender
            .send(Command::Flush(done_tx))
            .map_err(|_| GleanError::ChannelSend)?;
        done_rx.recv().map_err(|_| GleanError::ChannelReceive)
    }

    /// True when called from the worker thread itself.
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Run the remaining queue and stop the worker. Later launches are dropped.
    pub fn shutdown(&self) -> Result<()> {
        if self.is_worker_thread() {
            return Err(GleanError::DrainFromDispatcher);
        }
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.sender
            .send(Command::Shutdown)
            .map_err(|_| GleanError::ChannelSend)?;

        if let Some(handle) = self.worker.lock().take() {
            handle
                .join()
                .map_err(|_| GleanError::native("dispatcher worker panicked during shutdown"))?;
        }
        debug!("Dispatcher shut down");
        Ok(())
    }

    /// True once [`Dispatcher::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Snapshot of the dispatcher counters.
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            launched: self.counters.launched.load(Ordering::Relaxed),
            executed: self.counters.executed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if !self.is_worker_thread() {
            if let Err(e) = self.shutdown() {
                warn!(error = %e, "Dispatcher shutdown on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("shut_down", &self.is_shut_down())
            .field("stats", &self.stats())
            .finish()
    }
}
