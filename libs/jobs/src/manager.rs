//! # Async Job Registry
//!
//! ## Purpose
//!
//! Tracks pending jobs by [`JobId`] so incoming callbacks can be routed to the
//! job that is waiting for them. A finished, failed or timed out job is
//! removed from tracking. Ids the registry does not know are ignored, since
//! most traffic is not a reply to one of our requests.
//!
//! ## Timeout Poller
//!
//! [`AsyncJobManager::set_timeouts_enabled`] spawns a tokio task that calls
//! [`AsyncJobManager::cancel_timed_out_jobs`] every poll interval. The task
//! holds only a weak reference, so dropping the manager stops it.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use steam_types::JobId;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::id_source::JobIdSource;
use crate::job::{AsyncJob, AsyncJobMultiple, Callback, JobHandle};
use crate::options::JobOptions;

/// Concurrent registry of pending jobs
pub struct AsyncJobManager {
    jobs: DashMap<JobId, Arc<dyn JobHandle>>,
    id_source: JobIdSource,
    options: JobOptions,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncJobManager {
    pub fn new(options: JobOptions) -> Arc<Self> {
        Arc::new(Self {
            jobs: DashMap::new(),
            id_source: JobIdSource::new(),
            options,
            poller: Mutex::new(None),
        })
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Next job id for an outgoing request
    pub fn next_job_id(&self) -> JobId {
        self.id_source.next_job_id()
    }

    /// Number of jobs still pending
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_tracking(&self, job_id: JobId) -> bool {
        self.jobs.contains_key(&job_id)
    }

    /// Track a job; a job already registered under the same id is replaced
    pub fn start_job(&self, handle: Arc<dyn JobHandle>) {
        let job_id = handle.job_id();
        trace!(%job_id, "Tracking async job");
        if self.jobs.insert(job_id, handle).is_some() {
            debug!(%job_id, "Replaced async job with duplicate id");
        }
    }

    /// Create and track a single-result job with the configured timeout
    pub fn create_job<T: Send + 'static>(&self, job_id: JobId) -> AsyncJob<T> {
        let job = AsyncJob::new(
            job_id,
            self.options.default_timeout(),
            self.options.heartbeat_extension(),
        );
        self.start_job(job.handle());
        job
    }

    /// Create and track a multi-result job with the configured timeout
    pub fn create_multiple_job<T, F>(&self, job_id: JobId, finish_condition: F) -> AsyncJobMultiple<T>
    where
        T: Send + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let job = AsyncJobMultiple::new(
            job_id,
            self.options.default_timeout(),
            self.options.heartbeat_extension(),
            finish_condition,
        );
        self.start_job(job.handle());
        job
    }

    /// Route a callback to its job; the job stops being tracked once it is finished
    pub fn try_complete_job(&self, job_id: JobId, callback: Callback) {
        let Some(handle) = self.get_job(job_id) else {
            return;
        };

        if handle.add_result(callback) {
            trace!(%job_id, "Async job completed");
            self.jobs.remove(&job_id);
        } else if handle.is_resolved() {
            // Completed directly through the job rather than the registry
            self.jobs.remove(&job_id);
        }
    }

    /// Extend a job's lifetime
    pub fn heartbeat_job(&self, job_id: JobId) {
        if let Some(handle) = self.get_job(job_id) {
            trace!(%job_id, "Async job heartbeat");
            handle.heartbeat();
        }
    }

    /// Mark a job as failed by Steam and stop tracking it
    pub fn fail_job(&self, job_id: JobId) {
        if let Some((_, handle)) = self.jobs.remove(&job_id) {
            debug!(%job_id, "Async job failed remotely");
            handle.set_failed(true);
        }
    }

    /// Cancel every pending job as if it had timed out
    pub fn cancel_pending_jobs(&self) {
        let pending: Vec<JobId> = self.jobs.iter().map(|entry| *entry.key()).collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Cancelling pending async jobs");
        }
        for job_id in pending {
            if let Some((_, handle)) = self.jobs.remove(&job_id) {
                handle.set_failed(false);
            }
        }
    }

    /// Cancel and stop tracking every job whose timeout has elapsed
    pub fn cancel_timed_out_jobs(&self) {
        let now = Instant::now();
        let timed_out: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|entry| entry.value().is_timed_out(now))
            .map(|entry| *entry.key())
            .collect();

        for job_id in timed_out {
            if let Some((_, handle)) = self.jobs.remove(&job_id) {
                debug!(%job_id, "Async job timed out");
                handle.set_failed(false);
            }
        }
    }

    /// Start or stop the periodic timeout check; must be called inside a tokio runtime
    pub fn set_timeouts_enabled(self: &Arc<Self>, enable: bool) {
        let mut poller = self.poller.lock();
        let running = poller.is_some();
        match (enable, running) {
            (true, false) => {
                let period = self.options.poll_interval();
                *poller = Some(tokio::spawn(poll_timeouts(Arc::downgrade(self), period)));
                debug!(period_ms = period.as_millis() as u64, "Job timeout poller started");
            }
            (false, true) => {
                if let Some(task) = poller.take() {
                    task.abort();
                }
                debug!("Job timeout poller stopped");
            }
            _ => {}
        }
    }

    pub fn timeouts_enabled(&self) -> bool {
        self.poller.lock().is_some()
    }

    fn get_job(&self, job_id: JobId) -> Option<Arc<dyn JobHandle>> {
        self.jobs.get(&job_id).map(|entry| entry.value().clone())
    }
}

impl Drop for AsyncJobManager {
    fn drop(&mut self) {
        if let Some(task) = self.poller.get_mut().take() {
            task.abort();
        }
    }
}

async fn poll_timeouts(manager: Weak<AsyncJobManager>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // First tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(strong) = manager.upgrade() else {
            break;
        };
        strong.cancel_timed_out_jobs();
    }
}
