//! Ordered asynchronous execution queue
//!
//! A queue owns one worker thread. Jobs run strictly in submission order;
//! [`Queue::submit`] returns immediately and [`Queue::synchronize`] waits for
//! everything submitted so far. Nothing is ordered across different queues.
//!
//! A job reports a [`Status`]. The first non-success status is kept (sticky)
//! until the next `synchronize`, which returns it as `Error::Kernel` and clears
//! it, mirroring how asynchronous device errors surface at the next sync point.

use crate::error::{Error, Result, Status};
use parking_lot::{Condvar, Mutex};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() -> Status + Send + 'static>;

static NEXT_QUEUE_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct State {
    submitted: u64,
    completed: u64,
    error: Option<Status>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    idle: Condvar,
}

/// Ordered asynchronous execution queue. See the module docs.
pub struct Queue {
    id: usize,
    shared: Arc<Shared>,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Option<JoinHandle<()>>,
}

impl Queue {
    /// Create a queue and start its worker thread
    pub fn new() -> Result<Self> {
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared::default());
        let (sender, receiver) = mpsc::channel::<Job>();

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(format!("kernelgate-queue-{id}"))
            .spawn(move || {
                for job in receiver {
                    let status =
                        catch_unwind(AssertUnwindSafe(job)).unwrap_or(Status::InternalError);
                    let mut state = worker_shared.state.lock();
                    state.completed += 1;
                    if !status.is_success() && state.error.is_none() {
                        state.error = Some(status);
                    }
                    worker_shared.idle.notify_all();
                }
            })
            .map_err(|e| Error::Queue(format!("failed to spawn queue worker: {e}")))?;

        Ok(Self {
            id,
            shared,
            sender: Mutex::new(Some(sender)),
            worker: Some(worker),
        })
    }

    /// Process-unique identifier of this queue
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Enqueue a job behind all previously submitted jobs and return without
    /// waiting for it.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() -> Status + Send + 'static,
    {
        let sender = self.sender.lock();
        let sender = sender
            .as_ref()
            .ok_or_else(|| Error::Queue(format!("queue {} is shut down", self.id)))?;

        self.shared.state.lock().submitted += 1;
        if sender.send(Box::new(job)).is_err() {
            let mut state = self.shared.state.lock();
            state.submitted -= 1;
            return Err(Error::Queue(format!("queue {} worker has exited", self.id)));
        }
        log::trace!("queue {}: job submitted", self.id);
        Ok(())
    }

    /// Number of jobs submitted but not yet finished
    pub fn pending(&self) -> u64 {
        let state = self.shared.state.lock();
        state.submitted - state.completed
    }

    /// Block until every job submitted so far has finished.
    ///
    /// Returns the first failure status reported by a job since the previous
    /// synchronization, if any.
    pub fn synchronize(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        while state.completed < state.submitted {
            self.shared.idle.wait(&mut state);
        }
        match state.error.take() {
            Some(status) => Err(Error::Kernel(status)),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("id", &self.id)
            .field("pending", &self.pending())
            .finish()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain remaining jobs and exit.
        self.sender.lock().take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
