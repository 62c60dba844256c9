//! Shared application state behind the HTTP API.
//!
//! Holds the process-wide pacer and cancel scope, the wired-in recipient
//! source and delivery sink, and a registry of broadcast jobs so handlers
//! can confirm, observe, and cancel them while they run.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{event, info, Level};

use crate::cancel::{CancelScope, CancelToken};
use crate::dispatch::{DispatchJob, Dispatcher, JobResult, ProgressSnapshot};
use crate::error::{PalomaError, Result};
use crate::pacer::FixedWindowPacer;
use crate::ports::{
    AutoConfirm, ChannelGate, ConfirmHandle, ConfirmationGate, DeliverySink, ProgressSink,
    RecipientSource,
};
use crate::settings::DispatchSettings;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    settings: DispatchSettings,
    pacer: Arc<FixedWindowPacer>,
    source: Arc<dyn RecipientSource>,
    sink: Arc<dyn DeliverySink>,
    scope: CancelScope,
    jobs: RwLock<HashMap<u64, Arc<JobEntry>>>,
    next_job_id: AtomicU64,
}

impl AppState {
    pub fn new(
        settings: DispatchSettings,
        source: Arc<dyn RecipientSource>,
        sink: Arc<dyn DeliverySink>,
    ) -> Self {
        let pacer = Arc::new(FixedWindowPacer::new(
            settings.pacer_max_sends,
            settings.pacer_window,
        ));
        Self {
            settings,
            pacer,
            source,
            sink,
            scope: CancelScope::new(),
            jobs: RwLock::new(HashMap::new()),
            next_job_id: AtomicU64::new(0),
        }
    }

    pub fn pacer(&self) -> &FixedWindowPacer {
        &self.pacer
    }

    /// Administrative "stop everything": fires every job's linked token.
    pub fn cancel_all(&self) {
        info!("cancel-all requested, every running broadcast will stop at its next checkpoint");
        self.scope.cancel_all();
    }

    /// Resolve the audience, register a job entry, and launch dispatch in
    /// the background. Oversized audiences get a channel-backed gate that
    /// the confirm/decline endpoints feed.
    pub async fn start_broadcast(
        &self,
        group: &str,
        message: String,
        anonymous: bool,
        sender: Option<String>,
    ) -> Result<Arc<JobEntry>> {
        let recipients = self.source.members(group).await?;
        let total = recipients.len() as u32;
        let id = self.next_job_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = self.scope.token();

        let needs_confirmation = recipients.len() > self.settings.confirm_threshold;
        let (gate, confirm): (Arc<dyn ConfirmationGate>, Option<ConfirmHandle>) =
            if needs_confirmation {
                let (gate, handle) = ChannelGate::channel();
                (Arc::new(gate) as Arc<dyn ConfirmationGate>, Some(handle))
            } else {
                (Arc::new(AutoConfirm) as Arc<dyn ConfirmationGate>, None)
            };

        let entry = Arc::new(JobEntry {
            id,
            total,
            token: token.clone(),
            confirm: Mutex::new(confirm),
            progress: Arc::new(ProgressCell::new(total)),
            result: RwLock::new(None),
        });
        {
            let mut jobs = self
                .jobs
                .write()
                .map_err(|_| crate::concurrency_error!("job registry lock poisoned"))?;
            jobs.insert(id, entry.clone());
        }

        info!(
            job_id = id,
            group, total, needs_confirmation, "broadcast accepted"
        );

        let dispatcher = Dispatcher::new(self.pacer.clone(), self.settings.clone());
        let job = DispatchJob {
            recipients,
            message,
            anonymous,
            sender,
        };
        let sink = self.sink.clone();
        let progress: Arc<dyn ProgressSink> = entry.progress.clone();
        let entry_for_task = entry.clone();
        tokio::spawn(async move {
            let result = dispatcher.dispatch(job, sink, gate, progress, token).await;
            match entry_for_task.result.write() {
                Ok(mut slot) => *slot = Some(result),
                Err(err) => event!(
                    Level::ERROR,
                    message = "Failed storing job result",
                    err = format!("{:?}", err)
                ),
            }
        });

        Ok(entry)
    }

    pub fn get_job(&self, id: u64) -> Result<Arc<JobEntry>> {
        let jobs = self
            .jobs
            .read()
            .map_err(|_| crate::concurrency_error!("job registry lock poisoned"))?;
        jobs.get(&id).cloned().ok_or(PalomaError::JobNotFound(id))
    }
}

/// One tracked broadcast: its cancel token, confirmation handle (while it
/// is still awaiting an answer), live progress, and final result.
pub struct JobEntry {
    pub id: u64,
    pub total: u32,
    token: CancelToken,
    confirm: Mutex<Option<ConfirmHandle>>,
    pub progress: Arc<ProgressCell>,
    result: RwLock<Option<JobResult>>,
}

impl JobEntry {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn confirm(&self) -> Result<()> {
        self.take_confirm_handle()?.confirm();
        Ok(())
    }

    pub fn decline(&self) -> Result<()> {
        self.take_confirm_handle()?.decline();
        Ok(())
    }

    fn take_confirm_handle(&self) -> Result<ConfirmHandle> {
        let mut slot = self
            .confirm
            .lock()
            .map_err(|_| crate::concurrency_error!("confirmation handle lock poisoned"))?;
        slot.take().ok_or_else(|| {
            PalomaError::InvalidJobState("job is not awaiting confirmation".to_string())
        })
    }

    pub fn result(&self) -> Option<JobResult> {
        self.result
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state_label(&self) -> String {
        if let Some(result) = self.result() {
            return result.status.to_string();
        }
        let awaiting = self
            .confirm
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        if awaiting {
            "awaiting-confirmation".to_string()
        } else {
            "running".to_string()
        }
    }
}

/// Latest batch-boundary snapshot, readable by the status endpoint.
#[derive(Debug)]
pub struct ProgressCell {
    latest: RwLock<ProgressSnapshot>,
}

impl ProgressCell {
    pub fn new(total: u32) -> Self {
        Self {
            latest: RwLock::new(ProgressSnapshot {
                success: 0,
                fail: 0,
                pending: total,
                total,
            }),
        }
    }

    pub fn latest(&self) -> ProgressSnapshot {
        *self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProgressSink for ProgressCell {
    async fn publish(&self, update: ProgressSnapshot) {
        info!(
            success = update.success,
            fail = update.fail,
            pending = update.pending,
            total = update.total,
            "batch boundary"
        );
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = update;
    }
}
