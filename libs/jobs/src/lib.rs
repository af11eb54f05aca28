//! # Steam Async Jobs
//!
//! ## Purpose
//!
//! Correlates outgoing requests with the asynchronous callbacks Steam sends
//! back under the same [`JobId`]:
//!
//! - [`AsyncJob`] waits for exactly one result
//! - [`AsyncJobMultiple`] gathers results until a completion predicate passes
//! - [`AsyncJobManager`] routes callbacks, heartbeats and failures by job id
//!   and cancels jobs whose timeout elapses
//!
//! ## Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use steam_jobs::{AsyncJobManager, JobOptions};
//!
//! let manager = AsyncJobManager::new(JobOptions::default());
//! let job_id = manager.next_job_id();
//! let job = manager.create_job::<String>(job_id);
//!
//! manager.try_complete_job(job_id, Box::new("pong".to_string()));
//! assert_eq!(job.await.unwrap(), "pong");
//! assert_eq!(manager.pending_jobs(), 0);
//! # });
//! ```

pub mod error;
pub mod id_source;
pub mod job;
pub mod manager;
pub mod options;

pub use error::AsyncJobError;
pub use id_source::JobIdSource;
pub use job::{AsyncJob, AsyncJobMultiple, Callback, JobHandle, ResultSet};
pub use manager::AsyncJobManager;
pub use options::JobOptions;
pub use steam_types::JobId;
