//! Job id generation for outgoing requests

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use steam_types::JobId;

/// Issues sequential job ids stamped with the source's start time
#[derive(Debug)]
pub struct JobIdSource {
    sequence: AtomicU32,
    start_time: DateTime<Utc>,
}

impl JobIdSource {
    pub fn new() -> Self {
        Self::with_start_time(Utc::now())
    }

    pub fn with_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            sequence: AtomicU32::new(0),
            start_time: start_time.trunc_subsecs(0),
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Next id; the 20-bit sequential count wraps
    pub fn next_job_id(&self) -> JobId {
        let count = self.sequence.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        JobId::from_parts(count, self.start_time, 0, 0)
    }
}

impl Default for JobIdSource {
    fn default() -> Self {
        Self::new()
    }
}
