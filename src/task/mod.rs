//! Task Module
//!
//! Background work queue owned by the host. Garbage collection is handed
//! to it as deferred work and consults its backlog signal to yield to
//! other pending tasks.

mod worker;

pub use worker::WorkerQueue;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Queue that runs tasks in the background
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task; `name` is used for logging only
    fn execute(&self, name: &'static str, task: Task);

    /// Whether tasks are waiting to run
    fn has_backlog(&self) -> bool;
}

/// Runs every task inline on the calling thread. Never has a backlog.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateQueue;

impl TaskQueue for ImmediateQueue {
    fn execute(&self, name: &'static str, task: Task) {
        tracing::trace!(task = name, "running task inline");
        task();
    }

    fn has_backlog(&self) -> bool {
        false
    }
}
