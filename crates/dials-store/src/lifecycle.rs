//! Consumer lifecycle hooks.
//!
//! A [`Binding`](crate::Binding) never mounts its paths while it is being
//! constructed. It hands the mount to [`Lifecycle::after_commit`] and the
//! release to [`Lifecycle::on_teardown`], and the host decides when those run.

use std::{fmt, mem};

use parking_lot::Mutex;
use tracing::trace;

/// Deferred work handed to a lifecycle.
pub type Hook = Box<dyn FnOnce() + Send>;

/// The two moments a consumer's lifetime exposes.
pub trait Lifecycle {
    /// Run `hook` once the consumer's first observation has been committed.
    fn after_commit(&self, hook: Hook);

    /// Run `hook` exactly once when the consumer is permanently removed.
    fn on_teardown(&self, hook: Hook);
}

/// Queued hooks of a [`ScopedLifecycle`].
#[derive(Default)]
struct Queues {
    /// Pending commit hooks.
    commits: Vec<Hook>,
    /// Pending teardown hooks.
    teardowns: Vec<Hook>,
    /// Set once `teardown` has run.
    torn_down: bool,
}

/// Lifecycle driven by explicit [`commit`](Self::commit) and
/// [`teardown`](Self::teardown) calls.
///
/// Teardown happens at most once. Commit hooks still queued at teardown are
/// dropped, and hooks registered afterwards never run (teardown hooks run
/// immediately instead).
#[derive(Default)]
pub struct ScopedLifecycle {
    /// Hook queues.
    queues: Mutex<Queues>,
}

impl fmt::Debug for ScopedLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.queues.lock();
        f.debug_struct("ScopedLifecycle")
            .field("commits", &q.commits.len())
            .field("teardowns", &q.teardowns.len())
            .field("torn_down", &q.torn_down)
            .finish()
    }
}

impl ScopedLifecycle {
    /// New scope with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every queued commit hook, in registration order.
    pub fn commit(&self) {
        let hooks = {
            let mut q = self.queues.lock();
            if q.torn_down {
                return;
            }
            mem::take(&mut q.commits)
        };
        trace!(hooks = hooks.len(), "lifecycle commit");
        for hook in hooks {
            hook();
        }
    }

    /// Run every teardown hook. Later calls do nothing.
    pub fn teardown(&self) {
        let hooks = {
            let mut q = self.queues.lock();
            if q.torn_down {
                return;
            }
            q.torn_down = true;
            q.commits.clear();
            mem::take(&mut q.teardowns)
        };
        trace!(hooks = hooks.len(), "lifecycle teardown");
        for hook in hooks {
            hook();
        }
    }

    /// True once [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.queues.lock().torn_down
    }

    /// Number of commit hooks waiting to run.
    pub fn pending_commits(&self) -> usize {
        self.queues.lock().commits.len()
    }
}

impl Lifecycle for ScopedLifecycle {
    fn after_commit(&self, hook: Hook) {
        let mut q = self.queues.lock();
        if !q.torn_down {
            q.commits.push(hook);
        }
    }

    fn on_teardown(&self, hook: Hook) {
        let mut q = self.queues.lock();
        if q.torn_down {
            drop(q);
            hook();
            return;
        }
        q.teardowns.push(hook);
    }
}
