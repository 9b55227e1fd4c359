// CLASSIFICATION: COMMUNITY
// Filename: sync.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-19

//! Cancellation token and one-shot stop latch.
//!
//! Small std-only primitives backing the trace-pipe watcher lifecycle:
//! a token with a derive/trigger/observe contract and a latch fired
//! once when shutdown completes. Poisoned locks are recovered rather
//! than propagated; both types guard a single boolean.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: bool,
    children: Vec<Arc<TokenInner>>,
}

#[derive(Debug, Default)]
struct TokenInner {
    state: Mutex<TokenState>,
    cond: Condvar,
}

/// Cooperative cancellation token.
///
/// Cloning shares the token. [`CancelToken::child`] derives a new
/// token cancelled transitively when this one is, mirroring a derived
/// context. There is no forced interruption: holders observe the token
/// via [`CancelToken::is_cancelled`] or block on [`CancelToken::wait`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    /// Fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a token cancelled when `self` is cancelled.
    ///
    /// A child derived from an already-cancelled parent starts
    /// cancelled. Cancelling a child does not affect the parent.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        let mut state = self.lock();
        if state.cancelled {
            drop(state);
            child.cancel();
        } else {
            state.children.push(child.inner.clone());
        }
        child
    }

    /// Trigger cancellation. Idempotent; cascades to derived tokens.
    pub fn cancel(&self) {
        let children = {
            let mut state = self.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            self.inner.cond.notify_all();
            std::mem::take(&mut state.children)
        };
        for inner in children {
            CancelToken { inner }.cancel();
        }
    }

    /// Whether cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Block the calling thread until cancellation is triggered.
    pub fn wait(&self) {
        let mut state = self.lock();
        while !state.cancelled {
            state = self
                .inner
                .cond
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct LatchInner {
    fired: Mutex<bool>,
    cond: Condvar,
}

/// One-shot completion latch.
///
/// Fired by the single owner of the guarded resource once teardown is
/// done; any number of waiters are released and later waits return
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct StopLatch {
    inner: Arc<LatchInner>,
}

impl StopLatch {
    /// Unfired latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Release all current and future waiters. Idempotent.
    pub fn fire(&self) {
        let mut fired = self
            .inner
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *fired = true;
        self.inner.cond.notify_all();
    }

    /// Block until the latch fires.
    pub fn wait(&self) {
        let mut fired = self
            .inner
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*fired {
            fired = self
                .inner
                .cond
                .wait(fired)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Whether the latch has fired.
    pub fn is_fired(&self) -> bool {
        *self
            .inner
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn cancel_releases_waiter() {
        let token = CancelToken::new();
        let observer = token.clone();
        let handle = thread::spawn(move || observer.wait());
        thread::sleep(Duration::from_millis(10));
        assert!(!token.is_cancelled());
        token.cancel();
        handle.join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_cascades_to_children() {
        let parent = CancelToken::new();
        let child = parent.child();
        let grandchild = child.child();
        parent.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn child_of_cancelled_parent_starts_cancelled() {
        let parent = CancelToken::new();
        parent.cancel();
        assert!(parent.child().is_cancelled());
    }

    #[test]
    fn child_cancel_leaves_parent_untriggered() {
        let parent = CancelToken::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn latch_releases_all_waiters() {
        let latch = StopLatch::new();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let latch = latch.clone();
                thread::spawn(move || latch.wait())
            })
            .collect();
        assert!(!latch.is_fired());
        latch.fire();
        latch.fire();
        for handle in waiters {
            handle.join().unwrap();
        }
        // Waiting after the fact returns immediately.
        latch.wait();
        assert!(latch.is_fired());
    }
}
