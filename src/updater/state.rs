/// Refresh state machine and cycle bookkeeping
use crate::errors::ExplorerError;
use crate::snapshot::DashboardSnapshot;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::MutexGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
    /// Terminal: the timer is halted
    Stopped,
}

impl RefreshState {
    fn as_u8(self) -> u8 {
        match self {
            RefreshState::Idle => 0,
            RefreshState::Refreshing => 1,
            RefreshState::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => RefreshState::Refreshing,
            2 => RefreshState::Stopped,
            _ => RefreshState::Idle,
        }
    }
}

/// Atomic holder for [`RefreshState`]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(RefreshState::Idle.as_u8()))
    }

    pub(crate) fn get(&self) -> RefreshState {
        RefreshState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stopped is never left
    pub(crate) fn transition(&self, to: RefreshState) {
        let stopped = RefreshState::Stopped.as_u8();
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == stopped {
                    None
                } else {
                    Some(to.as_u8())
                }
            });
    }
}

/// Held for the whole cycle; dropping it (on any exit path) returns to Idle
/// and releases the single-flight lock.
pub(crate) struct CycleGuard<'a> {
    _lock: MutexGuard<'a, ()>,
    state: &'a StateCell,
}

impl<'a> CycleGuard<'a> {
    pub(crate) fn enter(lock: MutexGuard<'a, ()>, state: &'a StateCell) -> Self {
        state.transition(RefreshState::Refreshing);
        Self { _lock: lock, state }
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.state.transition(RefreshState::Idle);
    }
}

/// Result of asking for a refresh cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// This call ran a cycle and published a snapshot
    Published(Arc<DashboardSnapshot>),
    /// This call ran a cycle that aborted; the previous snapshot stays
    Failed(ExplorerError),
    /// Another cycle was in flight; this call waited for it to settle
    Joined,
    /// Another cycle was in flight; the trigger was dropped
    Skipped,
    /// The manager has been stopped
    Stopped,
}

impl CycleOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, CycleOutcome::Published(_))
    }

    pub fn snapshot(&self) -> Option<&Arc<DashboardSnapshot>> {
        match self {
            CycleOutcome::Published(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Counters exposed for monitoring
#[derive(Debug, Clone, Default)]
pub struct UpdateMetrics {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    /// Timer ticks dropped because a cycle was in flight
    pub cycles_skipped: u64,
    pub persist_failures: u64,
    pub blocks_persisted: u64,
    pub last_cycle_duration: Option<Duration>,
    pub last_error: Option<String>,
}
