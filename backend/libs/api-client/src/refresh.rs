//! Single-flight coordination of session refreshes.
//!
//! When several requests hit a 401 at the same time only the first one
//! (the leader) calls `/auth/refresh`. Everyone else parks on a oneshot
//! channel and is woken with the leader's outcome. The coordinator never
//! holds its lock across an `.await`.

use std::sync::Mutex;

use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed,
    /// The leader went away before finishing; the session state is unknown
    Abandoned,
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a caller that saw a 401 has to do next
pub enum RefreshRole<'a> {
    /// Perform the refresh and report the outcome
    Leader(RefreshLeader<'a>),
    /// Wait for the leader's outcome
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the leader if no refresh is running, otherwise queue up
    pub fn join(&self) -> RefreshRole<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshRole::Waiter(rx)
        } else {
            state.refreshing = true;
            RefreshRole::Leader(RefreshLeader {
                coordinator: self,
                finished: false,
            })
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers parked behind the running refresh
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    fn finish(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        let count = waiters.len();
        for waiter in waiters {
            // A waiter that gave up has dropped its receiver
            let _ = waiter.send(outcome);
        }
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        // The state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held by the caller that performs the refresh.
///
/// Dropping it without calling [`RefreshLeader::complete`] (for example when
/// the leader's future is cancelled) wakes every waiter with
/// [`RefreshOutcome::Abandoned`] so one of them can take over.
pub struct RefreshLeader<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl RefreshLeader<'_> {
    /// Publish the outcome to every waiter and clear the in-flight flag
    pub fn complete(mut self, outcome: RefreshOutcome) -> usize {
        self.finished = true;
        self.coordinator.finish(outcome)
    }
}

impl Drop for RefreshLeader<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Session refresh abandoned before completion");
            self.coordinator.finish(RefreshOutcome::Abandoned);
        }
    }
}

/// Outcome seen by a waiter
pub async fn wait(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    rx.await.unwrap_or(RefreshOutcome::Abandoned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_leader(role: RefreshRole<'_>) -> RefreshLeader<'_> {
        match role {
            RefreshRole::Leader(leader) => leader,
            RefreshRole::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn expect_waiter(role: RefreshRole<'_>) -> oneshot::Receiver<RefreshOutcome> {
        match role {
            RefreshRole::Waiter(rx) => rx,
            RefreshRole::Leader(_) => panic!("expected to wait for the refresh"),
        }
    }

    #[tokio::test]
    async fn test_first_caller_leads_and_others_wait() {
        let coordinator = RefreshCoordinator::new();

        let leader = expect_leader(coordinator.join());
        assert!(coordinator.is_refreshing());

        let first = expect_waiter(coordinator.join());
        let second = expect_waiter(coordinator.join());
        assert_eq!(coordinator.waiting(), 2);

        assert_eq!(leader.complete(RefreshOutcome::Refreshed), 2);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);

        assert_eq!(wait(first).await, RefreshOutcome::Refreshed);
        assert_eq!(wait(second).await, RefreshOutcome::Refreshed);
    }

    #[tokio::test]
    async fn test_failure_is_broadcast() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        let waiter = expect_waiter(coordinator.join());

        leader.complete(RefreshOutcome::Failed);
        assert_eq!(wait(waiter).await, RefreshOutcome::Failed);
    }

    #[tokio::test]
    async fn test_dropped_leader_abandons_waiters() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        let waiter = expect_waiter(coordinator.join());

        drop(leader);
        assert!(!coordinator.is_refreshing());
        assert_eq!(wait(waiter).await, RefreshOutcome::Abandoned);

        // A waiter that rejoins takes over the refresh
        expect_leader(coordinator.join()).complete(RefreshOutcome::Refreshed);
    }

    #[test]
    fn test_next_refresh_after_completion_gets_new_leader() {
        let coordinator = RefreshCoordinator::new();
        expect_leader(coordinator.join()).complete(RefreshOutcome::Refreshed);

        let leader = expect_leader(coordinator.join());
        leader.complete(RefreshOutcome::Failed);
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn test_waiter_that_gave_up_is_skipped() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        drop(expect_waiter(coordinator.join()));

        assert_eq!(leader.complete(RefreshOutcome::Refreshed), 1);
    }
}
