//! Main-thread guard
//!
//! Persistent store operations block on I/O. Running one on the host's UI
//! thread is a programming error, so it panics instead of returning.

use std::thread::{self, ThreadId};

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadChecker {
    main_thread: Option<ThreadId>,
}

impl ThreadChecker {
    pub fn new(main_thread: Option<ThreadId>) -> Self {
        Self { main_thread }
    }

    /// Panics if called on the configured main thread
    #[track_caller]
    pub fn check_not_main_thread(&self) {
        if let Some(main) = self.main_thread {
            assert!(
                thread::current().id() != main,
                "blocking feed store operation called on the main thread"
            );
        }
    }

    pub fn is_main_thread(&self) -> bool {
        self.main_thread == Some(thread::current().id())
    }
}
