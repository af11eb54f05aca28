//! # Async Jobs
//!
//! ## Purpose
//!
//! An async job correlates an outgoing request's [`JobId`] with the response
//! (or responses) Steam later sends back bearing the same id.
//!
//! ## Lifecycle
//!
//! ```text
//!            add_result ──► Completed(result)
//! Pending ──┼ set_failed(remote) ──► Failed(remote)
//!            └ timeout / cancel ──► Failed(timeout)
//! ```
//!
//! Only the first terminal transition is honored; later results and failures
//! are no-ops. Each job is split in two halves: the awaitable [`AsyncJob`] or
//! [`AsyncJobMultiple`] handed to the caller, and a shared state registered
//! with the [`crate::AsyncJobManager`] as a [`JobHandle`].

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use steam_types::JobId;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;

use crate::error::AsyncJobError;

/// Type-erased callback routed to a job by the registry
pub type Callback = Box<dyn Any + Send>;

/// Registry-facing side of a pending job
pub trait JobHandle: Send + Sync {
    fn job_id(&self) -> JobId;

    /// Offer a callback; returns `true` only for the result that finishes the job
    fn add_result(&self, callback: Callback) -> bool;

    /// The job has reached a terminal state
    fn is_resolved(&self) -> bool;

    /// Resolve as failed; `due_to_remote_failure` separates "Steam said no" from a timeout
    fn set_failed(&self, due_to_remote_failure: bool);

    /// Extend the timeout
    fn heartbeat(&self);

    fn is_timed_out(&self, now: Instant) -> bool;
}

/// Start instant plus a timeout that heartbeats extend
#[derive(Debug)]
struct JobTimer {
    started: Instant,
    timeout: Duration,
    heartbeat_extension: Duration,
}

impl JobTimer {
    fn new(timeout: Duration, heartbeat_extension: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            heartbeat_extension,
        }
    }

    fn is_timed_out(&self, now: Instant) -> bool {
        now >= self.started + self.timeout
    }

    fn heartbeat(&mut self) {
        self.timeout += self.heartbeat_extension;
    }
}

/// Sender that fires at most once
struct Completion<R> {
    sender: Mutex<Option<oneshot::Sender<R>>>,
}

impl<R> Completion<R> {
    fn new() -> (Self, oneshot::Receiver<R>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn is_resolved(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Returns false when the job had already resolved
    fn resolve(&self, value: R) -> bool {
        match self.sender.lock().take() {
            Some(tx) => {
                // The awaiting side may have been dropped; the job is still resolved
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }
}

fn downcast<T: 'static>(job_id: JobId, callback: Callback) -> Option<T> {
    match callback.downcast::<T>() {
        Ok(value) => Some(*value),
        Err(_) => {
            warn!(
                %job_id,
                expected = std::any::type_name::<T>(),
                "Ignoring callback of unexpected type"
            );
            None
        }
    }
}

fn poll_receiver<R>(
    receiver: &mut oneshot::Receiver<Result<R, AsyncJobError>>,
    cx: &mut Context<'_>,
) -> Poll<Result<R, AsyncJobError>> {
    match Pin::new(receiver).poll(cx) {
        Poll::Ready(Ok(result)) => Poll::Ready(result),
        // Registry dropped without resolving the job
        Poll::Ready(Err(_)) => Poll::Ready(Err(AsyncJobError::Cancelled)),
        Poll::Pending => Poll::Pending,
    }
}

struct SingleState<T> {
    job_id: JobId,
    timer: Mutex<JobTimer>,
    completion: Completion<Result<T, AsyncJobError>>,
}

impl<T: Send + 'static> JobHandle for SingleState<T> {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    fn add_result(&self, callback: Callback) -> bool {
        let Some(result) = downcast::<T>(self.job_id, callback) else {
            return false;
        };
        self.completion.resolve(Ok(result))
    }

    fn is_resolved(&self) -> bool {
        self.completion.is_resolved()
    }

    fn set_failed(&self, due_to_remote_failure: bool) {
        self.completion
            .resolve(Err(AsyncJobError::from_remote(due_to_remote_failure)));
    }

    fn heartbeat(&self) {
        self.timer.lock().heartbeat();
    }

    fn is_timed_out(&self, now: Instant) -> bool {
        self.timer.lock().is_timed_out(now)
    }
}

/// Awaitable job expecting exactly one result of type `T`
///
/// Resolves to the first result, [`AsyncJobError::RemoteFailure`] when Steam
/// reports a failure, or [`AsyncJobError::Cancelled`] on timeout.
pub struct AsyncJob<T> {
    state: Arc<SingleState<T>>,
    receiver: oneshot::Receiver<Result<T, AsyncJobError>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Unregistered job; hand [`AsyncJob::handle`] to a registry to route results into it
    pub fn new(job_id: JobId, timeout: Duration, heartbeat_extension: Duration) -> Self {
        let (completion, receiver) = Completion::new();
        Self {
            state: Arc::new(SingleState {
                job_id,
                timer: Mutex::new(JobTimer::new(timeout, heartbeat_extension)),
                completion,
            }),
            receiver,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.state.job_id
    }

    pub fn timeout(&self) -> Duration {
        self.state.timer.lock().timeout
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.state.timer.lock().timeout = timeout;
    }

    pub fn handle(&self) -> Arc<dyn JobHandle> {
        self.state.clone()
    }

    /// Deliver a result directly, bypassing the registry
    pub fn complete(&self, result: T) -> bool {
        self.state.completion.resolve(Ok(result))
    }
}

impl<T> Future for AsyncJob<T> {
    type Output = Result<T, AsyncJobError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        poll_receiver(&mut self.receiver, cx)
    }
}

/// Results gathered by an [`AsyncJobMultiple`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<T> {
    /// The completion predicate accepted the last result
    pub complete: bool,
    /// The set is partial because Steam reported a failure
    pub failed: bool,
    pub results: Vec<T>,
}

type FinishCondition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct MultipleState<T> {
    job_id: JobId,
    timer: Mutex<JobTimer>,
    results: Mutex<Vec<T>>,
    finish_condition: FinishCondition<T>,
    completion: Completion<Result<ResultSet<T>, AsyncJobError>>,
}

impl<T: Send + 'static> JobHandle for MultipleState<T> {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    fn add_result(&self, callback: Callback) -> bool {
        if self.completion.is_resolved() {
            return false;
        }
        let Some(result) = downcast::<T>(self.job_id, callback) else {
            return false;
        };

        let mut results = self.results.lock();
        let finished = (self.finish_condition)(&result);
        results.push(result);

        if finished {
            let results = std::mem::take(&mut *results);
            self.completion.resolve(Ok(ResultSet {
                complete: true,
                failed: false,
                results,
            }))
        } else {
            // More results are on the way
            self.timer.lock().heartbeat();
            false
        }
    }

    fn set_failed(&self, due_to_remote_failure: bool) {
        let mut results = self.results.lock();
        let outcome = if results.is_empty() {
            Err(AsyncJobError::from_remote(due_to_remote_failure))
        } else {
            Ok(ResultSet {
                complete: false,
                failed: due_to_remote_failure,
                results: std::mem::take(&mut *results),
            })
        };
        self.completion.resolve(outcome);
    }

    fn is_resolved(&self) -> bool {
        self.completion.is_resolved()
    }

    fn heartbeat(&self) {
        self.timer.lock().heartbeat();
    }

    fn is_timed_out(&self, now: Instant) -> bool {
        self.timer.lock().is_timed_out(now)
    }
}

/// Awaitable job accumulating results until a predicate accepts the newest one
///
/// Every result that does not complete the set acts as a heartbeat. A failure
/// after at least one result resolves successfully with a partial
/// [`ResultSet`]; a failure before any result resolves as an error.
pub struct AsyncJobMultiple<T> {
    state: Arc<MultipleState<T>>,
    receiver: oneshot::Receiver<Result<ResultSet<T>, AsyncJobError>>,
}

impl<T: Send + 'static> AsyncJobMultiple<T> {
    pub fn new<F>(
        job_id: JobId,
        timeout: Duration,
        heartbeat_extension: Duration,
        finish_condition: F,
    ) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let (completion, receiver) = Completion::new();
        Self {
            state: Arc::new(MultipleState {
                job_id,
                timer: Mutex::new(JobTimer::new(timeout, heartbeat_extension)),
                results: Mutex::new(Vec::new()),
                finish_condition: Box::new(finish_condition),
                completion,
            }),
            receiver,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.state.job_id
    }

    pub fn timeout(&self) -> Duration {
        self.state.timer.lock().timeout
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.state.timer.lock().timeout = timeout;
    }

    pub fn handle(&self) -> Arc<dyn JobHandle> {
        self.state.clone()
    }
}

impl<T> Future for AsyncJobMultiple<T> {
    type Output = Result<ResultSet<T>, AsyncJobError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        poll_receiver(&mut self.receiver, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_single_job_completes_once() {
        let job = AsyncJob::<u32>::new(JobId::from_u64(1), TEN, TEN);
        let handle = job.handle();

        assert!(handle.add_result(Box::new(7u32)));
        assert!(handle.is_resolved());
        // Only the first result finishes the job
        assert!(!handle.add_result(Box::new(8u32)));
        handle.set_failed(true);

        assert_eq!(job.await, Ok(7));
    }

    #[tokio::test]
    async fn test_single_job_ignores_wrong_type() {
        let job = AsyncJob::<u32>::new(JobId::from_u64(1), TEN, TEN);
        let handle = job.handle();

        assert!(!handle.add_result(Box::new("not a u32")));
        assert!(handle.add_result(Box::new(3u32)));
        assert_eq!(job.await, Ok(3));
    }

    #[tokio::test]
    async fn test_failure_kinds() {
        let remote = AsyncJob::<u32>::new(JobId::from_u64(1), TEN, TEN);
        remote.handle().set_failed(true);
        assert_eq!(remote.await, Err(AsyncJobError::RemoteFailure));

        let timeout = AsyncJob::<u32>::new(JobId::from_u64(2), TEN, TEN);
        timeout.handle().set_failed(false);
        assert_eq!(timeout.await, Err(AsyncJobError::Cancelled));
    }

    #[tokio::test]
    async fn test_dropped_handle_cancels() {
        let job = AsyncJob::<u32>::new(JobId::from_u64(1), TEN, TEN);
        let state = job.state.clone();
        drop(state.completion.sender.lock().take());
        assert_eq!(job.await, Err(AsyncJobError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_extends_rather_than_resets() {
        let job = AsyncJob::<u32>::new(JobId::from_u64(1), TEN, TEN);
        let handle = job.handle();

        tokio::time::advance(Duration::from_secs(5)).await;
        handle.heartbeat();
        assert_eq!(job.timeout(), Duration::from_secs(20));

        tokio::time::advance(Duration::from_secs(14)).await;
        assert!(!handle.is_timed_out(Instant::now()));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(handle.is_timed_out(Instant::now()));
    }

    #[tokio::test]
    async fn test_multiple_predicate_on_newest_result() {
        let job = AsyncJobMultiple::<u32>::new(JobId::from_u64(1), TEN, TEN, |r| *r == 0);
        let handle = job.handle();

        assert!(!handle.add_result(Box::new(3u32)));
        assert!(!handle.add_result(Box::new(2u32)));
        assert_eq!(job.timeout(), Duration::from_secs(30));
        assert!(handle.add_result(Box::new(0u32)));
        assert!(!handle.add_result(Box::new(0u32)));

        let set = job.await.unwrap();
        assert!(set.complete);
        assert!(!set.failed);
        assert_eq!(set.results, vec![3, 2, 0]);
    }

    #[tokio::test]
    async fn test_multiple_partial_failure() {
        let job = AsyncJobMultiple::<u32>::new(JobId::from_u64(1), TEN, TEN, |_| false);
        let handle = job.handle();
        handle.add_result(Box::new(1u32));
        handle.set_failed(true);

        let set = job.await.unwrap();
        assert!(!set.complete);
        assert!(set.failed);
        assert_eq!(set.results, vec![1]);
    }

    #[tokio::test]
    async fn test_multiple_failure_without_results() {
        let job = AsyncJobMultiple::<u32>::new(JobId::from_u64(1), TEN, TEN, |_| true);
        job.handle().set_failed(false);
        assert_eq!(job.await, Err(AsyncJobError::Cancelled));
    }
}
