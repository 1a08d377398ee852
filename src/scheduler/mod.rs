use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RelayError;

/// Work to run once a deferred delay has elapsed.
pub type DeferredTask = BoxFuture<'static, ()>;

/// Runs one-shot tasks after a delay.
#[async_trait]
pub trait DeferredScheduler: Send + Sync {
    /// Run `task` once after `delay`. The returned id cancels it.
    async fn schedule(
        &self,
        name: &str,
        delay: Duration,
        task: DeferredTask,
    ) -> Result<Uuid, RelayError>;

    /// Drop a task that has not fired yet.
    async fn cancel(&self, id: Uuid) -> Result<(), RelayError>;
}

/// Wrapper around tokio-cron-scheduler for deferred replies.
/// Clones share the same underlying scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Create a new scheduler
    pub async fn new() -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        Ok(Self { inner })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<()> {
        self.inner
            .start()
            .await
            .context("Failed to start scheduler")?;
        info!("Scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler. Pending tasks are dropped.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        info!("Scheduler stopped");
        Ok(())
    }
}

#[async_trait]
impl DeferredScheduler for Scheduler {
    async fn schedule(
        &self,
        name: &str,
        delay: Duration,
        task: DeferredTask,
    ) -> Result<Uuid, RelayError> {
        // The job closure is FnMut; the task is taken out on the only run.
        let slot = Arc::new(Mutex::new(Some(task)));
        let job_name = name.to_string();
        let job = Job::new_one_shot_async(delay, move |uuid, _lock| {
            let name = job_name.clone();
            let task = slot.lock().ok().and_then(|mut guard| guard.take());
            Box::pin(async move {
                match task {
                    Some(task) => {
                        debug!("Running deferred task '{}' ({})", name, uuid);
                        task.await;
                    }
                    None => warn!("Deferred task '{}' ({}) already ran", name, uuid),
                }
            })
        })
        .map_err(|e| RelayError::Scheduling(format!("{name}: {e:?}")))?;

        let id = self
            .inner
            .add(job)
            .await
            .map_err(|e| RelayError::Scheduling(format!("{name}: {e:?}")))?;

        debug!("Scheduled '{}' ({}) in {:?}", name, id, delay);
        Ok(id)
    }

    async fn cancel(&self, id: Uuid) -> Result<(), RelayError> {
        self.inner
            .remove(&id)
            .await
            .map_err(|e| RelayError::Scheduling(format!("cancel {id}: {e:?}")))
    }
}
