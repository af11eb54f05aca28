//! Registry-level async job tests
//!
//! Time is paused so timeout behaviour is exercised deterministically: sleeps
//! auto-advance the clock and the timeout poller fires on its own schedule.

use std::time::Duration;

use steam_jobs::{AsyncJobError, AsyncJobManager, JobId, JobOptions};
use tokio_test::{assert_pending, assert_ready, task};

#[derive(Debug, Clone, PartialEq)]
struct TestCallback {
    job_id: JobId,
    is_finished: bool,
}

impl TestCallback {
    fn new(job_id: JobId, is_finished: bool) -> Box<Self> {
        Box::new(Self {
            job_id,
            is_finished,
        })
    }
}

const JOB: JobId = JobId::from_u64(123);

#[tokio::test]
async fn test_job_registers_with_manager() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let _job = manager.create_job::<TestCallback>(JOB);

    assert!(manager.is_tracking(JOB));
    assert_eq!(manager.pending_jobs(), 1);
}

#[tokio::test]
async fn test_job_gives_back_callback_and_clears() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let job = manager.create_job::<TestCallback>(JOB);

    manager.try_complete_job(JOB, TestCallback::new(JOB, false));

    assert!(!manager.is_tracking(JOB));
    assert_eq!(job.await, Ok(*TestCallback::new(JOB, false)));
}

#[tokio::test]
async fn test_remote_failure_is_distinguished() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let job = manager.create_job::<TestCallback>(JOB);

    manager.fail_job(JOB);

    assert!(!manager.is_tracking(JOB));
    assert_eq!(job.await, Err(AsyncJobError::RemoteFailure));
}

#[tokio::test]
async fn test_cancel_pending_jobs() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let single = manager.create_job::<TestCallback>(JobId::from_u64(1));
    let multiple = manager.create_multiple_job::<TestCallback, _>(JobId::from_u64(2), |c| c.is_finished);
    manager.try_complete_job(JobId::from_u64(2), TestCallback::new(JobId::from_u64(2), false));

    manager.cancel_pending_jobs();

    assert_eq!(manager.pending_jobs(), 0);
    assert_eq!(single.await, Err(AsyncJobError::Cancelled));

    let partial = multiple.await.unwrap();
    assert!(!partial.complete);
    assert!(!partial.failed);
    assert_eq!(partial.results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_job_times_out() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);

    let job = manager.create_job::<TestCallback>(JOB);
    job.set_timeout(Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(!manager.is_tracking(JOB));
    assert_eq!(job.await, Err(AsyncJobError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_no_timeout_without_poller() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let job = manager.create_job::<TestCallback>(JOB);
    job.set_timeout(Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(manager.is_tracking(JOB));

    manager.cancel_timed_out_jobs();
    assert!(!manager.is_tracking(JOB));
}

#[tokio::test(start_paused = true)]
async fn test_default_timeout_is_ten_seconds() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);
    let job = manager.create_job::<TestCallback>(JOB);
    assert_eq!(job.timeout(), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    assert!(manager.is_tracking(JOB));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!manager.is_tracking(JOB));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_keeps_job_alive() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);
    let job = manager.create_job::<TestCallback>(JOB);
    job.set_timeout(Duration::from_secs(2));

    manager.heartbeat_job(JOB);
    assert_eq!(job.timeout(), Duration::from_secs(12));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(manager.is_tracking(JOB));

    manager.try_complete_job(JOB, TestCallback::new(JOB, true));
    assert!(job.await.is_ok());
}

#[tokio::test]
async fn test_multiple_finishes_on_predicate() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let job = manager.create_multiple_job::<TestCallback, _>(JOB, |c| c.is_finished);
    let mut job = task::spawn(job);

    manager.try_complete_job(JOB, TestCallback::new(JOB, false));
    assert!(manager.is_tracking(JOB));
    assert_pending!(job.poll());

    manager.try_complete_job(JOB, TestCallback::new(JOB, true));
    assert!(!manager.is_tracking(JOB));

    let set = assert_ready!(job.poll()).unwrap();
    assert!(set.complete);
    assert!(!set.failed);
    assert_eq!(set.results.len(), 2);
    assert!(set.results[1].is_finished);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_extends_timeout_on_message() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);

    let job = manager.create_multiple_job::<TestCallback, _>(JOB, |c| c.is_finished);
    job.set_timeout(Duration::from_secs(5));
    let mut job = task::spawn(job);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_pending!(job.poll());

    // Result 1 of 2 extends the timeout by ten seconds
    manager.try_complete_job(JOB, TestCallback::new(JOB, false));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_pending!(job.poll());
    assert!(manager.is_tracking(JOB));

    manager.try_complete_job(JOB, TestCallback::new(JOB, true));
    let set = assert_ready!(job.poll()).unwrap();
    assert!(set.complete);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_times_out_without_results() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);

    let job = manager.create_multiple_job::<TestCallback, _>(JOB, |_| false);
    job.set_timeout(Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!manager.is_tracking(JOB));
    assert_eq!(job.await, Err(AsyncJobError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_multiple_completes_on_incomplete_result() {
    let manager = AsyncJobManager::new(JobOptions::default());
    manager.set_timeouts_enabled(true);

    let job = manager.create_multiple_job::<TestCallback, _>(JOB, |c| c.is_finished);
    manager.try_complete_job(JOB, TestCallback::new(JOB, false));
    // Shorten the timeout the result just extended
    job.set_timeout(Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(5)).await;

    let set = job.await.unwrap();
    assert!(!set.complete);
    assert!(!set.failed);
    assert_eq!(set.results, vec![*TestCallback::new(JOB, false)]);
}

#[tokio::test]
async fn test_multiple_completes_on_incomplete_result_and_failure() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let job = manager.create_multiple_job::<TestCallback, _>(JOB, |c| c.is_finished);

    manager.try_complete_job(JOB, TestCallback::new(JOB, false));
    manager.fail_job(JOB);

    let set = job.await.unwrap();
    assert!(!set.complete);
    assert!(set.failed);
    assert_eq!(set.results.len(), 1);
}

#[tokio::test]
async fn test_sequential_job_ids() {
    let manager = AsyncJobManager::new(JobOptions::default());
    let first = manager.next_job_id();
    let second = manager.next_job_id();

    assert_ne!(first, second);
    assert_eq!(second.sequential_count(), first.sequential_count() + 1);
    assert_eq!(first.start_time_seconds(), second.start_time_seconds());
}
