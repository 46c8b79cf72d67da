//! Threaded driver for a [`Memory`].
//!
//! The memory itself is single-threaded: one cycle at a time, never
//! interrupted. A [`Reasoner`] shares it behind a mutex and runs cycles on a
//! background thread, one per tick, so a host can keep feeding input while the
//! system thinks. Cancellation is cooperative and observed between cycles
//! only.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{NoesisError, Result};
use crate::memory::Memory;

/// Cancellation token shared with the worker thread.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a background run paces itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause between two cycles.
    pub tick: Duration,
    /// Stop after this many cycles; run until cancelled when `None`.
    pub cycles: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { tick: Duration::from_millis(1), cycles: None }
    }
}

/// Handle to a background run.
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancelToken,
    started: Instant,
    completed: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Request cancellation. The worker finishes the cycle it is in first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
    /// Cycles completed by this run so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
    /// Waits for the run to end and returns the number of cycles it ran.
    pub fn join(mut self) -> u64 {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("reasoner thread panicked");
            }
        }
        self.completed()
    }
}

#[derive(Clone)]
pub struct Reasoner {
    memory: Arc<Mutex<Memory>>,
}

impl Reasoner {
    pub fn new(memory: Memory) -> Self {
        Self { memory: Arc::new(Mutex::new(memory)) }
    }
    pub fn input(&self, text: &str) -> Result<()> {
        self.lock()?.input(text)
    }
    /// Runs `cycles` cycles on the calling thread.
    pub fn step(&self, cycles: usize) -> Result<()> {
        self.lock()?.run(cycles);
        Ok(())
    }
    /// Read access to the memory between cycles.
    pub fn with_memory<T>(&self, f: impl FnOnce(&Memory) -> T) -> Result<T> {
        let memory = self.lock()?;
        Ok(f(&memory))
    }

    /// Runs cycles on a background thread until cancelled or, with
    /// `options.cycles`, until that many have been run.
    pub fn start(&self, options: RunOptions) -> RunHandle {
        let cancel = CancelToken::new();
        let completed = Arc::new(AtomicU64::new(0));
        let memory = Arc::clone(&self.memory);
        let token = cancel.clone();
        let counter = Arc::clone(&completed);
        let join = thread::spawn(move || {
            loop {
                if token.is_cancelled() {
                    debug!("reasoner cancelled");
                    break;
                }
                if options.cycles.is_some_and(|max| counter.load(Ordering::SeqCst) >= max) {
                    break;
                }
                match memory.lock() {
                    Ok(mut memory) => memory.cycle(),
                    Err(e) => {
                        warn!(error = %e, "memory lock poisoned, stopping");
                        break;
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                if !options.tick.is_zero() {
                    thread::sleep(options.tick);
                }
            }
        });
        RunHandle { cancel, started: Instant::now(), completed, join: Some(join) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Memory>> {
        self.memory.lock().map_err(|e| NoesisError::Lock(e.to_string()))
    }
}
