//! Bulk-notification dispatch: batching, pacing, cancellation, tallying.
pub mod batch;
pub mod dispatcher;
pub mod job;

pub use dispatcher::Dispatcher;
pub use job::{
    DeliveryOutcome, DeliveryStatus, DispatchJob, JobResult, JobStatus, ProgressSnapshot,
    Recipient, Tally,
};
