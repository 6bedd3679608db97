//! Single-threaded background worker

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender};
use tracing::{debug, warn};

use crate::error::Result;

use super::{Task, TaskQueue};

type Job = (&'static str, Task);

/// Runs tasks in FIFO order on one background thread.
///
/// `has_backlog` reports tasks that are queued but not yet started; the
/// task currently running does not count.
pub struct WorkerQueue {
    sender: Option<Sender<Job>>,
    pending: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerQueue {
    /// Spawn the worker thread
    pub fn start(thread_name: &str) -> Result<Self> {
        let (sender, receiver) = channel::unbounded::<Job>();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = Arc::clone(&pending);

        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                for (name, task) in receiver {
                    worker_pending.fetch_sub(1, Ordering::SeqCst);
                    debug!(task = name, "running background task");
                    task();
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            pending,
            handle: Some(handle),
        })
    }

    /// Number of queued tasks that have not started
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting work, drain the queue and join the worker
    ///
    /// Called from one of the worker's own tasks (the last handle dropped
    /// inside a task), the worker is detached instead; it exits once the
    /// queue is drained.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                debug!("worker shut down from its own thread; detaching");
                return;
            }
            if handle.join().is_err() {
                warn!("background worker panicked");
            }
        }
    }
}

impl TaskQueue for WorkerQueue {
    fn execute(&self, name: &'static str, task: Task) {
        let Some(sender) = &self.sender else {
            warn!(task = name, "worker stopped; dropping task");
            return;
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        if sender.send((name, task)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(task = name, "worker disconnected; dropping task");
        }
    }

    fn has_backlog(&self) -> bool {
        self.pending() > 0
    }
}

impl Drop for WorkerQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}
