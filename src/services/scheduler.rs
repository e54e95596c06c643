//! Repeating-task scheduler with cancellable handles.
//!
//! DESIGN
//! ======
//! `Scheduler::repeat` runs a job immediately and then once per period until
//! the returned `TaskHandle` is cancelled or dropped. Runs never overlap: a
//! slow job delays the next tick, and missed ticks are skipped rather than
//! bunched up.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub trait Scheduler: Send + Sync {
    fn repeat(&self, period: Duration, job: Job) -> TaskHandle;
}

/// Owning handle to a repeating task. Dropping it stops the task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    #[must_use]
    pub fn from_join_handle(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stop the task. No further runs start after this returns.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Schedules jobs on the ambient tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn repeat(&self, period: Duration, job: Job) -> TaskHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                job().await;
            }
        });
        TaskHandle::from_join_handle(handle)
    }
}
