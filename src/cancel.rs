//! Cooperative cancellation for dispatch jobs.
//!
//! Each job gets its own [`CancelToken`], linked to a process-wide
//! [`CancelScope`]. Cancelling a token stops only that job; cancelling the
//! scope stops every job linked to it. Cancellation is advisory and
//! checkpoint-based: the dispatcher consults its token at batch boundaries
//! and inside the pacer-wait loop, and an in-flight send is never
//! interrupted.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Flag {
    fired: AtomicBool,
    notify: Notify,
}

impl Flag {
    fn fire(&self) {
        let already_fired = self.fired.swap(true, Ordering::SeqCst);
        if !already_fired {
            self.notify.notify_waiters();
        }
    }

    fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if self.is_fired() {
            return;
        }
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register interest before the re-check so a concurrent fire() between
        // the check and the await cannot be missed.
        notified.as_mut().enable();
        if self.is_fired() {
            return;
        }
        notified.await;
    }
}

/// Root "cancel everything" signal shared across all jobs in the process.
#[derive(Clone, Debug, Default)]
pub struct CancelScope {
    flag: Arc<Flag>,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh per-job token linked to this scope.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            own: Arc::new(Flag::default()),
            scope: self.flag.clone(),
        }
    }

    /// Request cancellation of every job linked to this scope.
    pub fn cancel_all(&self) {
        self.flag.fire();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_fired()
    }
}

/// Per-job cancellation token. Clones observe the same signal.
#[derive(Clone, Debug)]
pub struct CancelToken {
    own: Arc<Flag>,
    scope: Arc<Flag>,
}

impl CancelToken {
    /// A token tied to nothing but itself, for standalone dispatch runs.
    pub fn detached() -> Self {
        CancelScope::new().token()
    }

    /// Request cancellation of this job only.
    pub fn cancel(&self) {
        self.own.fire();
    }

    /// True once this job, or its whole scope, has been asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.own.is_fired() || self.scope.is_fired()
    }

    /// Resolves when this job or its scope is cancelled. Resolves
    /// immediately if cancellation was already requested.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.own.wait() => {}
            _ = self.scope.wait() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[test]
    fn token_cancel_is_local() {
        let scope = CancelScope::new();
        let a = scope.token();
        let b = scope.token();

        a.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn scope_cancel_fans_out() {
        let scope = CancelScope::new();
        let a = scope.token();
        let b = scope.token();

        scope.cancel_all();
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
    }

    #[test]
    fn clones_share_the_signal() {
        let token = CancelToken::detached();
        let twin = token.clone();
        twin.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_wakes_waiter_on_token_fire() {
        let token = CancelToken::detached();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::task::yield_now().await;
        token.cancel();

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .expect("waiter should not panic");
    }

    #[tokio::test]
    async fn cancelled_wakes_waiter_on_scope_fire() {
        let scope = CancelScope::new();
        let token = scope.token();
        let handle = tokio::spawn(async move { token.cancelled().await });

        tokio::task::yield_now().await;
        scope.cancel_all();

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .expect("waiter should not panic");
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_fired() {
        let token = CancelToken::detached();
        token.cancel();
        timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("already-cancelled token should not block");
    }
}
