//! Batch-sequential, intra-batch-concurrent bulk dispatch.
//!
//! Batches run strictly one after another; inside a batch every recipient
//! gets its own delivery task, and the batch is a fan-out/fan-in barrier:
//! nothing from batch N+1 starts until every task of batch N has settled.
//! Each task blocks on the shared pacer before touching the delivery sink,
//! so the whole process respects one global send budget no matter how many
//! jobs run concurrently.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::dispatch::batch;
use crate::dispatch::job::{
    DeliveryOutcome, DispatchJob, JobResult, JobStatus, Recipient, Tally,
};
use crate::pacer::FixedWindowPacer;
use crate::ports::{ConfirmDecision, ConfirmationGate, DeliverySink, ProgressSink};
use crate::settings::DispatchSettings;

pub struct Dispatcher {
    pacer: Arc<FixedWindowPacer>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(pacer: Arc<FixedWindowPacer>, settings: DispatchSettings) -> Self {
        Self { pacer, settings }
    }

    /// Run one bulk-dispatch job to a terminal state.
    ///
    /// Never returns an error: per-recipient failures are counted, a
    /// declined or expired confirmation and cancellation are statuses.
    /// Cancellation is honored at batch starts and inside the pacer wait;
    /// deliveries already launched always run to completion.
    pub async fn dispatch(
        &self,
        job: DispatchJob,
        sink: Arc<dyn DeliverySink>,
        gate: Arc<dyn ConfirmationGate>,
        progress: Arc<dyn ProgressSink>,
        token: CancelToken,
    ) -> JobResult {
        let total = job.recipients.len() as u32;

        if job.recipients.len() > self.settings.confirm_threshold {
            match tokio::time::timeout(self.settings.confirm_timeout, gate.decide(job.recipients.len()))
                .await
            {
                Ok(ConfirmDecision::Confirmed) => {
                    info!(total, "oversized dispatch confirmed");
                }
                Ok(ConfirmDecision::Declined) => {
                    info!(total, "oversized dispatch declined, nothing sent");
                    return JobResult::unstarted(total, JobStatus::Canceled);
                }
                Ok(ConfirmDecision::TimedOut) | Err(_) => {
                    warn!(total, "confirmation window expired, nothing sent");
                    return JobResult::unstarted(total, JobStatus::AbortedByConfirmationTimeout);
                }
            }
        }

        let tally = Arc::new(Tally::new(total));
        let message = Arc::new(job.formatted_message());
        let batches = batch::partition(&job.recipients, self.settings.batch_size);
        let batch_count = batches.len();
        let mut status = JobStatus::Completed;

        for (index, recipients) in batches.into_iter().enumerate() {
            if token.is_cancelled() {
                info!(
                    batch = index + 1,
                    batches = batch_count,
                    "dispatch canceled, remaining batches skipped"
                );
                status = JobStatus::Canceled;
                break;
            }

            progress.publish(tally.snapshot()).await;
            debug!(batch = index + 1, batches = batch_count, size = recipients.len(), "batch start");

            let mut tasks = JoinSet::new();
            for recipient in recipients {
                tasks.spawn(deliver_one(
                    self.pacer.clone(),
                    sink.clone(),
                    token.clone(),
                    recipient,
                    message.clone(),
                    tally.clone(),
                    self.settings.retry_slack,
                ));
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    error!(err = %err, "delivery task failed to settle");
                }
            }

            // Settling delay between batches, independent of pacer state but
            // abandoned early if the job is cancelled mid-wait.
            if index + 1 < batch_count {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = sleep(self.settings.batch_delay) => {}
                }
            }
        }

        // Pending work after the loop means deliveries were abandoned inside
        // the final batch, which only happens under cancellation.
        if status == JobStatus::Completed
            && token.is_cancelled()
            && tally.snapshot().pending > 0
        {
            status = JobStatus::Canceled;
        }

        let result = tally.finish(status);
        info!(
            status = %result.status,
            success = result.success,
            fail = result.fail,
            pending = result.pending,
            total = result.total,
            "bulk dispatch finished"
        );
        result
    }
}

/// Deliver to a single recipient: wait for a pacer token, then send.
///
/// Cancellation before the token is granted abandons the delivery without
/// counting it either way. Once the send is in flight it always settles
/// into a counted outcome.
async fn deliver_one(
    pacer: Arc<FixedWindowPacer>,
    sink: Arc<dyn DeliverySink>,
    token: CancelToken,
    recipient: Recipient,
    message: Arc<String>,
    tally: Arc<Tally>,
    retry_slack: Duration,
) {
    loop {
        if token.is_cancelled() {
            debug!(recipient = %recipient.id, "delivery abandoned before pacing grant");
            return;
        }
        if pacer.try_acquire() {
            break;
        }
        let wait = pacer.time_until_next_allowed() + retry_slack;
        debug!(
            recipient = %recipient.id,
            wait_ms = wait.as_millis() as u64,
            "send budget exhausted, waiting for next window"
        );
        tokio::select! {
            _ = token.cancelled() => {
                debug!(recipient = %recipient.id, "delivery abandoned during pacer wait");
                return;
            }
            _ = sleep(wait) => {}
        }
    }

    let outcome = match sink.deliver(&recipient, &message).await {
        Ok(()) => DeliveryOutcome::delivered(&recipient),
        Err(failure) => {
            warn!(recipient = %recipient.id, reason = %failure.reason, "delivery failed");
            DeliveryOutcome::failed(&recipient, failure.reason)
        }
    };
    tally.record(&outcome);
}
