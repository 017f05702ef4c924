//! Concurrent fan-out of provider calls
//!
//! One task per detail, launched in sequence order. After every `batch_size` launches
//! the dispatcher sleeps `pause` before launching more; this caps the launch rate,
//! not the number of calls in flight. `dispatch` returns only after every task has
//! finished.
//!
//! The fan-out runs on its own spawned task. Dropping the future returned by
//! `dispatch` (a client hanging up, say) detaches the run instead of aborting it: every
//! launched call still runs to completion or timeout and every detail reaches a terminal
//! status.

use super::sink::{ErrorSink, TaskError};
use super::store::JobStore;
use super::types::{DetailUpdate, JobDetail};
use super::updater::ResultUpdater;
use crate::config::DispatchConfig;
use crate::core::providers::{ProviderError, RegisteredProvider};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a dispatch run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Tasks launched, one per detail
    pub launched: usize,
    /// Throttle pauses taken between batches
    pub pauses: usize,
    /// Tasks that panicked instead of finishing
    pub aborted: usize,
}

/// Fans out one provider call per detail
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    updater: ResultUpdater,
    sink: ErrorSink,
    batch_size: usize,
    pause: Duration,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn JobStore>, sink: ErrorSink, config: &DispatchConfig) -> Self {
        Self {
            updater: ResultUpdater::new(store.clone()),
            store,
            sink,
            batch_size: config.batch_size.max(1),
            pause: config.pause(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Run every detail of a job through `provider` and wait for all of them
    pub async fn dispatch(
        &self,
        job_id: Uuid,
        provider: &RegisteredProvider,
        details: Vec<JobDetail>,
    ) -> DispatchReport {
        let run = tokio::spawn(self.clone().drive(job_id, provider.clone(), details));
        match run.await {
            Ok(report) => report,
            Err(err) => {
                self.sink.report(TaskError::new(
                    job_id,
                    None,
                    format!("dispatch run did not finish: {}", err),
                ));
                DispatchReport::default()
            }
        }
    }

    async fn drive(
        self,
        job_id: Uuid,
        provider: RegisteredProvider,
        mut details: Vec<JobDetail>,
    ) -> DispatchReport {
        details.sort_by_key(|detail| detail.sequence);

        let product = provider.provider.product();
        info!(
            job_id = %job_id,
            product = %product,
            items = details.len(),
            "Dispatching job"
        );

        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();

        for (index, detail) in details.into_iter().enumerate() {
            if index > 0 && index % self.batch_size == 0 {
                debug!(job_id = %job_id, launched = index, "Batch launched, pausing");
                tokio::time::sleep(self.pause).await;
                report.pauses += 1;
            }

            let task = DetailTask {
                job_id,
                store: self.store.clone(),
                updater: self.updater.clone(),
                sink: self.sink.clone(),
                provider: provider.clone(),
                call_timeout: self.call_timeout,
            };
            tasks.spawn(task.run(detail));
            report.launched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                report.aborted += 1;
                self.sink.report(TaskError::new(
                    job_id,
                    None,
                    format!("dispatch task did not finish: {}", err),
                ));
            }
        }

        info!(
            job_id = %job_id,
            launched = report.launched,
            pauses = report.pauses,
            "Dispatch drained"
        );
        report
    }
}

/// Everything one task needs; owns exactly one detail row
struct DetailTask {
    job_id: Uuid,
    store: Arc<dyn JobStore>,
    updater: ResultUpdater,
    sink: ErrorSink,
    provider: RegisteredProvider,
    call_timeout: Duration,
}

impl DetailTask {
    async fn run(self, detail: JobDetail) {
        let detail_id = detail.id;
        if let Err(err) = self.execute(detail).await {
            self.sink
                .report(TaskError::new(self.job_id, Some(detail_id), err.to_string()));
        }
    }

    async fn execute(&self, detail: JobDetail) -> Result<()> {
        let adapter = &self.provider.provider;

        let item = match adapter.item_kind().validate(&detail.item) {
            Ok(item) => item,
            Err(err) => {
                debug!(detail_id = %detail.id, "Rejected item: {}", err);
                return self
                    .updater
                    .record(detail.id, &DetailUpdate::error(err.to_string()))
                    .await;
            }
        };

        self.store.mark_detail_in_progress(detail.id).await?;

        let outcome = tokio::time::timeout(
            self.call_timeout,
            adapter.verify_item(&self.provider.api_key, &item),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::timeout(
                adapter.product().as_str(),
                format!("no response within {:?}", self.call_timeout),
            ))
        });

        if let Err(err) = &outcome {
            warn!(detail_id = %detail.id, "Provider call failed: {}", err);
            self.sink
                .report(TaskError::new(self.job_id, Some(detail.id), err.to_string()));
        }

        self.updater
            .record_outcome(detail.id, adapter.as_ref(), &outcome)
            .await
            .map(|_| ())
    }
}
