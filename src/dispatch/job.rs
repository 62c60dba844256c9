//! Job-level data: recipients, outcomes, progress arithmetic.
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One delivery target. Identity lives in `id`; `address` is whatever the
/// delivery sink needs to reach them and plays no part in equality.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Recipient {
    pub id: String,
    pub address: String,
}

impl PartialEq for Recipient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Recipient {}

impl std::hash::Hash for Recipient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Everything one bulk-dispatch invocation needs. Created per call, never
/// persisted; pacing and batch sizing come from `DispatchSettings`.
#[derive(Clone, Debug)]
pub struct DispatchJob {
    pub recipients: Vec<Recipient>,
    pub message: String,
    pub anonymous: bool,
    pub sender: Option<String>,
}

impl DispatchJob {
    /// Render the outbound message, attributing the sender unless the job
    /// was marked anonymous.
    pub fn formatted_message(&self) -> String {
        if self.anonymous {
            return self.message.clone();
        }
        match &self.sender {
            Some(sender) => format!("From {}:\n{}", sender, self.message),
            None => self.message.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
}

/// Outcome of a single delivery attempt; consumed immediately by the tally.
#[derive(Clone, Debug)]
pub struct DeliveryOutcome {
    pub recipient_id: String,
    pub status: DeliveryStatus,
    pub at: DateTime<Utc>,
}

impl DeliveryOutcome {
    pub fn delivered(recipient: &Recipient) -> Self {
        Self {
            recipient_id: recipient.id.clone(),
            status: DeliveryStatus::Delivered,
            at: Utc::now(),
        }
    }

    pub fn failed(recipient: &Recipient, reason: String) -> Self {
        Self {
            recipient_id: recipient.id.clone(),
            status: DeliveryStatus::Failed(reason),
            at: Utc::now(),
        }
    }
}

/// Terminal state of a dispatch job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Completed,
    Canceled,
    AbortedByConfirmationTimeout,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Canceled => write!(f, "canceled"),
            JobStatus::AbortedByConfirmationTimeout => {
                write!(f, "aborted-by-confirmation-timeout")
            }
        }
    }
}

/// Point-in-time view of a running job. `pending` is always derived, so
/// `success + fail + pending == total` holds at every observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub success: u32,
    pub fail: u32,
    pub pending: u32,
    pub total: u32,
}

/// Final report handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub status: JobStatus,
    pub success: u32,
    pub fail: u32,
    pub pending: u32,
    pub total: u32,
}

impl JobResult {
    /// Result for a job that never attempted a single delivery.
    pub fn unstarted(total: u32, status: JobStatus) -> Self {
        Self {
            status,
            success: 0,
            fail: 0,
            pending: total,
            total,
        }
    }
}

/// Running success/fail counters for one job. Delivery tasks record their
/// outcomes concurrently; `pending` is never stored, only derived.
#[derive(Debug)]
pub struct Tally {
    success: AtomicU32,
    fail: AtomicU32,
    total: u32,
}

impl Tally {
    pub fn new(total: u32) -> Self {
        Self {
            success: AtomicU32::new(0),
            fail: AtomicU32::new(0),
            total,
        }
    }

    pub fn record(&self, outcome: &DeliveryOutcome) {
        match outcome.status {
            DeliveryStatus::Delivered => self.success.fetch_add(1, Ordering::Relaxed),
            DeliveryStatus::Failed(_) => self.fail.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let success = self.success.load(Ordering::Relaxed);
        let fail = self.fail.load(Ordering::Relaxed);
        ProgressSnapshot {
            success,
            fail,
            pending: self.total.saturating_sub(success + fail),
            total: self.total,
        }
    }

    pub fn finish(&self, status: JobStatus) -> JobResult {
        let snapshot = self.snapshot();
        JobResult {
            status,
            success: snapshot.success,
            fail: snapshot.fail,
            pending: snapshot.pending,
            total: snapshot.total,
        }
    }
}
