//! Collaborator seams for the dispatcher.
//!
//! The dispatcher never talks to the outside world directly: recipient
//! enumeration, message delivery, operator confirmation, and progress
//! reporting all go through these traits. The service wires real
//! implementations in (`roster`, `sinks`, the HTTP confirm endpoints);
//! tests script them.
use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tracing::info;

use crate::dispatch::{ProgressSnapshot, Recipient};
use crate::error::Result;

/// Opaque per-recipient delivery failure reported by the messaging
/// platform (privacy settings, blocked sender, ...). Counted, never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendFailure {
    pub reason: String,
}

impl SendFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Operator's answer at the confirmation gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmDecision {
    Confirmed,
    Declined,
    TimedOut,
}

/// Resolves a group identifier to its current member set: opaque,
/// deduplicated, captured at invocation time. Failure here is fatal to the
/// job before any batch runs.
#[async_trait]
pub trait RecipientSource: Send + Sync {
    async fn members(&self, group: &str) -> Result<Vec<Recipient>>;
}

/// Delivers one formatted message to one recipient.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &str,
    ) -> std::result::Result<(), SendFailure>;
}

/// Presents the confirm/decline decision for an oversized job. The
/// dispatcher bounds the wait with its configured timeout, so
/// implementations may block indefinitely.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn decide(&self, total: usize) -> ConfirmDecision;
}

/// Receives one progress tuple per batch boundary.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn publish(&self, update: ProgressSnapshot);
}

/// Gate for jobs below the confirmation threshold and for unattended runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationGate for AutoConfirm {
    async fn decide(&self, _total: usize) -> ConfirmDecision {
        ConfirmDecision::Confirmed
    }
}

/// Progress sink that only logs; for dispatch runs with no live observer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

#[async_trait]
impl ProgressSink for TracingProgress {
    async fn publish(&self, update: ProgressSnapshot) {
        info!(
            success = update.success,
            fail = update.fail,
            pending = update.pending,
            total = update.total,
            "batch boundary"
        );
    }
}

/// One-shot confirmation gate fed by an external decision, e.g. the HTTP
/// confirm/decline endpoints. Dropping the [`ConfirmHandle`] unanswered
/// counts as declining.
#[derive(Debug)]
pub struct ChannelGate {
    decision: Mutex<Option<oneshot::Receiver<bool>>>,
}

/// Sending half of a [`ChannelGate`]; consumed by the first answer.
#[derive(Debug)]
pub struct ConfirmHandle {
    tx: oneshot::Sender<bool>,
}

impl ConfirmHandle {
    pub fn confirm(self) {
        let _ = self.tx.send(true);
    }

    pub fn decline(self) {
        let _ = self.tx.send(false);
    }
}

impl ChannelGate {
    pub fn channel() -> (Self, ConfirmHandle) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                decision: Mutex::new(Some(rx)),
            },
            ConfirmHandle { tx },
        )
    }
}

#[async_trait]
impl ConfirmationGate for ChannelGate {
    async fn decide(&self, _total: usize) -> ConfirmDecision {
        let rx = self.decision.lock().await.take();
        match rx {
            Some(rx) => match rx.await {
                Ok(true) => ConfirmDecision::Confirmed,
                // A dropped handle means nobody can ever answer
                Ok(false) | Err(_) => ConfirmDecision::Declined,
            },
            // decide() ran once already; treat a second consult as declined
            None => ConfirmDecision::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_gate_confirms() {
        let (gate, handle) = ChannelGate::channel();
        handle.confirm();
        assert_eq!(gate.decide(100).await, ConfirmDecision::Confirmed);
    }

    #[tokio::test]
    async fn channel_gate_declines() {
        let (gate, handle) = ChannelGate::channel();
        handle.decline();
        assert_eq!(gate.decide(100).await, ConfirmDecision::Declined);
    }

    #[tokio::test]
    async fn dropped_handle_reads_as_declined() {
        let (gate, handle) = ChannelGate::channel();
        drop(handle);
        assert_eq!(gate.decide(100).await, ConfirmDecision::Declined);
    }

    #[tokio::test]
    async fn auto_confirm_always_confirms() {
        assert_eq!(AutoConfirm.decide(10_000).await, ConfirmDecision::Confirmed);
    }
}
