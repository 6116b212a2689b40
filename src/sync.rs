//! # Session Synchronization
//!
//! Resolution work that mutates the local repository (find, fetch, add) is
//! bracketed by a [`SyncContext`]. All contexts of a process share one
//! reader/writer lock: shared contexts run side by side, an exclusive context
//! runs alone.
//!
//! The lock is reentrant per thread. A thread holding it exclusively may open
//! further exclusive or shared contexts, and a thread holding it shared may
//! open further shared ones, without blocking on itself. A thread that is the
//! only reader may also take the exclusive side. Two readers both asking for
//! the exclusive side wait on each other forever, so upgrade only when no
//! other thread can hold the shared side.
//!
//! Waiting writers hold back threads that start reading, so readers cannot
//! starve a writer. Readers that were already waiting when a writer let go
//! are admitted before the next writer.
//!
//! This lock only coordinates threads of one process. Other processes are
//! kept in line by the tracking file locks of [`crate::tracking`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::thread::{self, ThreadId};

use log::trace;
use parking_lot::{Condvar, Mutex};

static GLOBAL_LOCK: LazyLock<Arc<ReentrantRwLock>> = LazyLock::new(Arc::default);

#[derive(Debug, Default)]
struct LockState {
    /// Thread holding the exclusive side, with its hold count
    writer: Option<(ThreadId, usize)>,
    /// Shared holds per thread
    readers: HashMap<ThreadId, usize>,
    waiting_writers: usize,
    /// Times the exclusive side was fully released
    write_releases: u64,
}

impl LockState {
    fn can_read(&self, thread: ThreadId, ticket: u64) -> bool {
        match self.writer {
            Some((owner, _)) => owner == thread,
            None => {
                self.readers.contains_key(&thread)
                    || self.waiting_writers == 0
                    || self.write_releases > ticket
            }
        }
    }

    fn can_write(&self, thread: ThreadId) -> bool {
        match self.writer {
            Some((owner, _)) => owner == thread,
            None => self.readers.keys().all(|reader| *reader == thread),
        }
    }
}

/// Shared/exclusive lock that threads may take again while holding it
#[derive(Debug, Default)]
struct ReentrantRwLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl ReentrantRwLock {
    fn lock(&self, thread: ThreadId, shared: bool) {
        let mut state = self.state.lock();
        if shared {
            let ticket = state.write_releases;
            while !state.can_read(thread, ticket) {
                self.released.wait(&mut state);
            }
            *state.readers.entry(thread).or_default() += 1;
        } else {
            if !state.can_write(thread) {
                state.waiting_writers += 1;
                while !state.can_write(thread) {
                    self.released.wait(&mut state);
                }
                state.waiting_writers -= 1;
            }
            let holds = state.writer.map_or(0, |(_, holds)| holds);
            state.writer = Some((thread, holds + 1));
        }
    }

    fn unlock(&self, thread: ThreadId, shared: bool) {
        let mut state = self.state.lock();
        if shared {
            let Some(holds) = state.readers.get_mut(&thread) else {
                return;
            };
            *holds -= 1;
            if *holds == 0 {
                state.readers.remove(&thread);
            }
        } else {
            let writer = state.writer;
            match writer {
                Some((owner, holds)) if owner == thread && holds > 1 => {
                    state.writer = Some((owner, holds - 1));
                }
                Some((owner, _)) if owner == thread => {
                    state.writer = None;
                    state.write_releases += 1;
                }
                _ => return,
            }
        }
        drop(state);
        self.released.notify_all();
    }
}

/// Hands out [`SyncContext`]s bound to one lock
#[derive(Debug, Clone)]
pub struct SyncContextFactory {
    lock: Arc<ReentrantRwLock>,
}

impl Default for SyncContextFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncContextFactory {
    /// Factory bound to the process-wide lock.
    pub fn new() -> Self {
        Self {
            lock: Arc::clone(&GLOBAL_LOCK),
        }
    }

    /// Factory bound to a private lock, unrelated to any other factory.
    pub fn isolated() -> Self {
        Self {
            lock: Arc::default(),
        }
    }

    pub fn new_context(&self, shared: bool) -> SyncContext {
        SyncContext {
            lock: Arc::clone(&self.lock),
            shared,
            owner: None,
            holds: 0,
        }
    }
}

/// A shared or exclusive claim on the lock of its factory
///
/// `acquire` is reentrant within one context: only the first call blocks.
/// Everything is released by `close`, which also runs on drop. The claim
/// belongs to the thread that made the first `acquire`.
pub struct SyncContext {
    lock: Arc<ReentrantRwLock>,
    shared: bool,
    owner: Option<ThreadId>,
    holds: usize,
}

impl SyncContext {
    /// Blocks until the lock is held in this context's mode.
    pub fn acquire(&mut self) {
        if self.owner.is_none() {
            trace!(
                "Acquiring {} sync context",
                if self.shared { "shared" } else { "exclusive" }
            );
            let thread = thread::current().id();
            self.lock.lock(thread, self.shared);
            self.owner = Some(thread);
        }
        self.holds += 1;
    }

    /// Releases the lock; a no-op when nothing is held.
    pub fn close(&mut self) {
        if let Some(thread) = self.owner.take() {
            self.lock.unlock(thread, self.shared);
            trace!("Released sync context after {} hold(s)", self.holds);
        }
        self.holds = 0;
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn is_held(&self) -> bool {
        self.owner.is_some()
    }

    /// Number of `acquire` calls since the lock was taken.
    pub fn hold_count(&self) -> usize {
        self.holds
    }
}

impl Drop for SyncContext {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("shared", &self.shared)
            .field("held", &self.is_held())
            .field("holds", &self.holds)
            .finish()
    }
}
